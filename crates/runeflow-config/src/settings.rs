//! Immutable settings snapshot assembled once at startup.

use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Everything the plugins would otherwise read from the process environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub docker: DockerSettings,
    pub aws: AwsSettings,
    pub npm: NpmSettings,
    pub elastic_beanstalk: BeanstalkSettings,
    /// Home directory used for credential files and container volumes
    pub home_dir: Option<PathBuf>,
    /// Log commands instead of executing them
    pub dry_run: bool,
}

#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DockerSettings {
    pub username: Option<String>,
    pub password: Option<String>,
    pub registry: Option<String>,
}

#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AwsSettings {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NpmSettings {
    pub auth_token: Option<String>,
    pub registry_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BeanstalkSettings {
    /// `branch:environment|branch:environment`
    pub deployment_pattern: Option<String>,
}

fn redacted(value: &Option<String>) -> &'static str {
    if value.is_some() { "<redacted>" } else { "<unset>" }
}

impl fmt::Debug for DockerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DockerSettings")
            .field("username", &self.username)
            .field("password", &redacted(&self.password))
            .field("registry", &self.registry)
            .finish()
    }
}

impl fmt::Debug for AwsSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsSettings")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &redacted(&self.secret_access_key))
            .finish()
    }
}

impl fmt::Debug for NpmSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NpmSettings")
            .field("auth_token", &redacted(&self.auth_token))
            .field("registry_url", &self.registry_url)
            .finish()
    }
}

/// Environment variables mapped onto [`Settings`] fields.
pub const ENV_VARS: &[&str] = &[
    "DOCKER_USERNAME",
    "DOCKER_PASSWORD",
    "DOCKER_REGISTRY",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "NPM_AUTH_TOKEN",
    "NPM_REGISTRY_URL",
    "EB_DEPLOYMENT_PATTERN_STRING",
    "HOME",
    "RUNEFLOW_DRY_RUN",
];

impl Settings {
    /// Overlays environment values (via `lookup`) on top of `self`.
    ///
    /// Empty values are ignored so that an exported-but-blank variable does
    /// not shadow the config file.
    pub fn overlay_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        fn set(slot: &mut Option<String>, value: Option<String>) {
            if value.is_some() {
                *slot = value;
            }
        }

        set(&mut self.docker.username, get("DOCKER_USERNAME"));
        set(&mut self.docker.password, get("DOCKER_PASSWORD"));
        set(&mut self.docker.registry, get("DOCKER_REGISTRY"));
        set(&mut self.aws.access_key_id, get("AWS_ACCESS_KEY_ID"));
        set(&mut self.aws.secret_access_key, get("AWS_SECRET_ACCESS_KEY"));
        set(&mut self.npm.auth_token, get("NPM_AUTH_TOKEN"));
        set(&mut self.npm.registry_url, get("NPM_REGISTRY_URL"));
        set(
            &mut self.elastic_beanstalk.deployment_pattern,
            get("EB_DEPLOYMENT_PATTERN_STRING"),
        );

        if let Some(home) = get("HOME") {
            self.home_dir = Some(PathBuf::from(home));
        }
        if let Some(dry_run) = get("RUNEFLOW_DRY_RUN") {
            self.dry_run = matches!(dry_run.to_ascii_lowercase().as_str(), "1" | "true" | "yes");
        }

        self
    }

    /// Home directory, falling back to the platform lookup.
    pub fn home(&self) -> Option<PathBuf> {
        self.home_dir.clone().or_else(dirs::home_dir)
    }
}
