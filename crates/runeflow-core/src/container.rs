//! Throwaway-container execution.
//!
//! Plugins whose CLI is not expected on the host (aws-cli, eb-cli) run their
//! commands inside a disposable `docker run --rm` container.

use crate::error::ContainerError;
use crate::runner::{CommandOutput, CommandRunner};
use crate::strings::shell_quote;
use async_trait::async_trait;

/// Runs commands inside a container image.
#[async_trait]
pub trait ContainerProvider: Send + Sync {
    /// Makes `name=value` visible to every later [`ContainerProvider::run`].
    fn add_environment_variable(&mut self, name: &str, value: &str) -> Result<(), ContainerError>;

    async fn run(&self, command: &str, description: &str) -> Result<CommandOutput, ContainerError>;
}

/// [`ContainerProvider`] backed by `docker run --rm`.
pub struct DockerContainer<R> {
    image: String,
    volumes: Vec<String>,
    environment: Vec<(String, String)>,
    runner: R,
}

impl<R: CommandRunner> DockerContainer<R> {
    pub fn new(image: impl Into<String>, runner: R) -> Self {
        Self {
            image: image.into(),
            volumes: Vec::new(),
            environment: Vec::new(),
            runner,
        }
    }

    /// Adds a `host:container` volume mapping.
    pub fn with_volume(mut self, volume: impl Into<String>) -> Self {
        self.volumes.push(volume.into());
        self
    }

    pub fn image(&self) -> &str {
        &self.image
    }

    /// Full `docker run` line for `command`.
    pub fn command_line(&self, command: &str) -> String {
        self.render(command, false)
    }

    /// [`DockerContainer::command_line`] with every environment value masked.
    pub fn redacted_command_line(&self, command: &str) -> String {
        self.render(command, true)
    }

    fn render(&self, command: &str, redact: bool) -> String {
        let mut parts = vec!["docker run --rm".to_string()];

        for (name, value) in &self.environment {
            if redact {
                parts.push(format!("-e {}=***", name));
            } else {
                parts.push(format!("-e {}", shell_quote(&format!("{}={}", name, value))));
            }
        }
        for volume in &self.volumes {
            parts.push(format!("-v {}", shell_quote(volume)));
        }

        parts.push(shell_quote(&self.image));
        parts.push(format!("sh -c {}", shell_quote(command)));
        parts.join(" ")
    }
}

fn is_valid_variable_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

#[async_trait]
impl<R: CommandRunner> ContainerProvider for DockerContainer<R> {
    fn add_environment_variable(&mut self, name: &str, value: &str) -> Result<(), ContainerError> {
        if !is_valid_variable_name(name) {
            return Err(ContainerError::InvalidVariableName(name.to_string()));
        }

        match self.environment.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.environment.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    async fn run(&self, command: &str, description: &str) -> Result<CommandOutput, ContainerError> {
        let line = self.command_line(command);
        let redacted = self.redacted_command_line(command);
        tracing::debug!("Running in {}: {}", self.image, command);

        let description = if description.is_empty() {
            format!("Running in {}", self.image)
        } else {
            description.to_string()
        };

        Ok(self.runner.run_redacted(&line, &redacted, &description).await?)
    }
}
