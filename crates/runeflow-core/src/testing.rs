//! Test doubles for [`CommandRunner`].

use crate::error::{CommandError, Result};
use crate::runner::{CommandOutput, CommandRunner};
use async_trait::async_trait;
use std::sync::Mutex;

/// Records every command and fails the ones matching configured rules.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    commands: Mutex<Vec<String>>,
    redacted: Mutex<Vec<String>>,
    descriptions: Mutex<Vec<String>>,
    fail_calls: Vec<usize>,
    fail_containing: Vec<String>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the `index`-th call (zero based).
    pub fn failing_call(mut self, index: usize) -> Self {
        self.fail_calls.push(index);
        self
    }

    /// Fails every command containing `needle`.
    pub fn failing_when(mut self, needle: impl Into<String>) -> Self {
        self.fail_containing.push(needle.into());
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Loggable forms of the recorded commands.
    pub fn redacted_commands(&self) -> Vec<String> {
        self.redacted.lock().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn descriptions(&self) -> Vec<String> {
        self.descriptions.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    async fn run_redacted(
        &self,
        command: &str,
        redacted: &str,
        description: &str,
    ) -> Result<CommandOutput> {
        let index = {
            let mut commands = self.commands.lock().unwrap_or_else(|e| e.into_inner());
            commands.push(command.to_string());
            commands.len() - 1
        };
        self.redacted
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(redacted.to_string());
        self.descriptions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(description.to_string());

        let fails = self.fail_calls.contains(&index)
            || self.fail_containing.iter().any(|n| command.contains(n.as_str()));
        if fails {
            return Err(CommandError::Failed {
                command: redacted.to_string(),
                status: Some(1),
                stderr: "simulated failure".to_string(),
            });
        }

        Ok(CommandOutput::default())
    }
}
