//! Environment-derived parameters (project name, branch, commit, release).
//!
//! Library code never reads the process environment. The binary assembles a
//! provider once at startup and injects it into every coordinator.

use std::collections::HashMap;
use std::fmt;

/// Keys understood by a [`ParameterProvider`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKey {
    ProjectName,
    BranchName,
    ShortHash,
    IsRelease,
    ReleaseVersion,
    DockerRegistry,
}

impl ParameterKey {
    pub const ALL: [ParameterKey; 6] = [
        ParameterKey::ProjectName,
        ParameterKey::BranchName,
        ParameterKey::ShortHash,
        ParameterKey::IsRelease,
        ParameterKey::ReleaseVersion,
        ParameterKey::DockerRegistry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKey::ProjectName => "ProjectName",
            ParameterKey::BranchName => "BranchName",
            ParameterKey::ShortHash => "ShortHash",
            ParameterKey::IsRelease => "IsRelease",
            ParameterKey::ReleaseVersion => "ReleaseVersion",
            ParameterKey::DockerRegistry => "DockerRegistry",
        }
    }
}

impl fmt::Display for ParameterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque key → value lookup for environment-derived defaults.
pub trait ParameterProvider: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// Typed convenience over [`ParameterProvider::get`].
    fn parameter(&self, key: ParameterKey) -> Option<String> {
        self.get(key.as_str()).filter(|v| !v.is_empty())
    }

    /// Interprets a parameter as a flag (`true`, `1`, `yes`).
    fn flag(&self, key: ParameterKey) -> bool {
        self.parameter(key)
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
            .unwrap_or(false)
    }
}

/// In-memory parameter set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticParameters {
    values: HashMap<String, String>,
}

impl StaticParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: ParameterKey, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: ParameterKey, value: impl Into<String>) {
        self.values.insert(key.as_str().to_string(), value.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl ParameterProvider for StaticParameters {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }
}

impl<P: ParameterProvider + ?Sized> ParameterProvider for std::sync::Arc<P> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }
}
