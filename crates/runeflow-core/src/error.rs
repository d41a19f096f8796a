use std::path::PathBuf;
use thiserror::Error;

/// Failure of an external command issued through a [`crate::CommandRunner`].
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("failed to spawn `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {}", display_status(.status))]
    Failed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },
}

impl CommandError {
    /// The command line that failed.
    pub fn command(&self) -> &str {
        match self {
            CommandError::Spawn { command, .. } | CommandError::Failed { command, .. } => command,
        }
    }

    /// Exit code of the process, if it ran and exited normally.
    pub fn status(&self) -> Option<i32> {
        match self {
            CommandError::Spawn { .. } => None,
            CommandError::Failed { status, .. } => *status,
        }
    }
}

fn display_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {}", code),
        None => "no exit status (terminated by signal)".to_string(),
    }
}

/// Errors raised while writing credential files.
#[derive(Error, Debug)]
pub enum CredentialFileError {
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to back up {path}: {source}")]
    Backup {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// A mandatory credential is absent from both explicit input and settings.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialsError {
    #[error("{what} is mandatory: pass it explicitly or set {env}")]
    Missing { what: &'static str, env: &'static str },
}

/// Errors from the containerized execution wrapper.
#[derive(Error, Debug)]
pub enum ContainerError {
    #[error("invalid environment variable name: {0}")]
    InvalidVariableName(String),

    #[error(transparent)]
    Command(#[from] CommandError),
}

pub type Result<T> = std::result::Result<T, CommandError>;
