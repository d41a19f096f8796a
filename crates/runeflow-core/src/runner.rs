//! External command execution.
//!
//! Every plugin builds its command line deterministically and hands it to a
//! [`CommandRunner`] together with a human-readable description. Command
//! lines carrying secrets also pass a redacted form, which is the only one
//! that reaches logs and errors.

use crate::error::{CommandError, Result};
use async_trait::async_trait;
use std::process::Stdio;
use tokio::process::Command;

/// Captured output of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runs a shell command line, failing on non-zero exit.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Runs `command`, logging and reporting it as `redacted`.
    async fn run_redacted(
        &self,
        command: &str,
        redacted: &str,
        description: &str,
    ) -> Result<CommandOutput>;

    async fn run(&self, command: &str, description: &str) -> Result<CommandOutput> {
        self.run_redacted(command, command, description).await
    }
}

#[async_trait]
impl<R: CommandRunner + ?Sized> CommandRunner for std::sync::Arc<R> {
    async fn run_redacted(
        &self,
        command: &str,
        redacted: &str,
        description: &str,
    ) -> Result<CommandOutput> {
        (**self).run_redacted(command, redacted, description).await
    }
}

/// Executes commands through `sh -c`.
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    dry_run: bool,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs commands instead of executing them.
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run_redacted(
        &self,
        command: &str,
        redacted: &str,
        description: &str,
    ) -> Result<CommandOutput> {
        tracing::info!("{}", description);

        if self.dry_run {
            tracing::info!("[dry-run] {}", redacted);
            return Ok(CommandOutput::default());
        }

        tracing::debug!("Running: {}", redacted);

        // Dropping the future (fail-fast abort) kills the child
        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| CommandError::Spawn {
                command: redacted.to_string(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();

        if !output.status.success() {
            tracing::debug!("Command failed: {}\n{}", redacted, stderr.trim_end());
            return Err(CommandError::Failed {
                command: redacted.to_string(),
                status: output.status.code(),
                stderr,
            });
        }

        Ok(CommandOutput { stdout, stderr })
    }
}
