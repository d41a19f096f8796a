//! Registry login and logout.
//!
//! Credentials come from explicit arguments first, then from the
//! [`DockerSettings`] snapshot (`DOCKER_USERNAME`, `DOCKER_PASSWORD`,
//! `DOCKER_REGISTRY`).

use crate::error::AuthError;
use runeflow_config::DockerSettings;
use runeflow_core::{CommandRunner, require_credential, shell_quote};

/// Explicit login values; any of them may be omitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoginRequest<'a> {
    pub username: Option<&'a str>,
    pub password: Option<&'a str>,
    pub registry: Option<&'a str>,
}

pub struct RegistryAuth<R> {
    runner: R,
    settings: DockerSettings,
}

impl<R: CommandRunner> RegistryAuth<R> {
    pub fn new(runner: R, settings: DockerSettings) -> Self {
        Self { runner, settings }
    }

    /// `docker login -u <user> -p <password> [registry]`
    ///
    /// Without a registry docker logs into its default (Docker Hub).
    pub async fn login(&self, request: LoginRequest<'_>) -> Result<(), AuthError> {
        let username = require_credential(
            request.username,
            self.settings.username.as_deref(),
            "username",
            "DOCKER_USERNAME",
        )?;
        let password = require_credential(
            request.password,
            self.settings.password.as_deref(),
            "password",
            "DOCKER_PASSWORD",
        )?;
        let registry = self.registry(request.registry);

        let command = login_command(&username, &shell_quote(&password), registry.as_deref());
        let redacted = login_command(&username, "***", registry.as_deref());

        let target = display_registry(registry.as_deref());
        self.runner
            .run_redacted(
                &command,
                &redacted,
                &format!("Logging in to {} as {}", target, username),
            )
            .await
            .map_err(|e| AuthError::LoginFailed {
                registry: target.to_string(),
                status: e.status(),
            })?;

        tracing::info!("Logged in to {}", target);
        Ok(())
    }

    /// `docker logout [registry]`
    pub async fn logout(&self, registry: Option<&str>) -> Result<(), AuthError> {
        let registry = self.registry(registry);

        let mut command = "docker logout".to_string();
        if let Some(registry) = &registry {
            command.push(' ');
            command.push_str(&shell_quote(registry));
        }

        let target = display_registry(registry.as_deref());
        self.runner
            .run(&command, &format!("Logging out of {}", target))
            .await
            .map_err(|source| AuthError::LogoutFailed {
                registry: target.to_string(),
                source,
            })?;
        Ok(())
    }

    fn registry(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .or(self.settings.registry.as_deref())
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
    }
}

fn login_command(username: &str, password: &str, registry: Option<&str>) -> String {
    let mut command = format!("docker login -u {} -p {}", shell_quote(username), password);
    if let Some(registry) = registry {
        command.push(' ');
        command.push_str(&shell_quote(registry));
    }
    command
}

fn display_registry(registry: Option<&str>) -> &str {
    registry.unwrap_or("the default registry")
}
