use runeflow_core::{CommandError, CredentialsError};
use std::fmt;
use thiserror::Error;

/// Descriptor resolution failures. Raised before any command is issued.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("Invalid image name '{name}': only lowercase letters, digits, '-' and '_' are allowed")]
    InvalidName { name: String },

    #[error("Invalid tag '{tag}' for image '{name}': {reason}")]
    InvalidTag {
        name: String,
        tag: String,
        reason: String,
    },

    #[error("Malformed descriptor fragment '{fragment}': {reason}")]
    Malformed { fragment: String, reason: String },

    #[error("Invalid descriptor document: {0}")]
    InvalidDocument(String),

    #[error("Parameter {key} is required to compute defaults but is not set")]
    MissingParameter { key: String },

    #[error("Image '{name}' is built from several files and cannot be expressed as a document")]
    NotRepresentable { name: String },
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error("Invalid build argument '{0}': expected KEY=VALUE")]
    InvalidBuildArg(String),

    #[error("Build failed for {build_file}: {source}")]
    BuildFailed {
        build_file: String,
        #[source]
        source: CommandError,
    },
}

impl BuildError {
    /// User-facing message with a hint for the common failures.
    pub fn user_message(&self) -> String {
        match self {
            BuildError::Descriptor(DescriptorError::InvalidName { name }) => format!(
                "{}\n\
                 \n\
                 Hint: image names are normalized tokens such as 'my-image'.\n\
                 Use '<name>[:<tag>][[<Dockerfile>]]', e.g. 'api:v1[docker/Dockerfile.api]'.",
                DescriptorError::InvalidName { name: name.clone() }
            ),
            BuildError::BuildFailed { build_file, source } => format!(
                "Build failed for {}\n\
                 command: {}\n\
                 \n\
                 Check the Dockerfile and the docker output above.",
                build_file,
                source.command()
            ),
            _ => self.to_string(),
        }
    }

    /// Exit status of the failed build command, when there is one.
    pub fn status(&self) -> Option<i32> {
        match self {
            BuildError::BuildFailed { source, .. } => source.status(),
            _ => None,
        }
    }
}

/// Step of a push that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushStep {
    Tag,
    Push,
}

impl fmt::Display for PushStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushStep::Tag => f.write_str("tag"),
            PushStep::Push => f.write_str("push"),
        }
    }
}

/// One reference that could not be published.
#[derive(Debug)]
pub struct PushFailure {
    pub reference: String,
    pub step: PushStep,
    pub source: CommandError,
}

impl fmt::Display for PushFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} failed: {})", self.reference, self.step, self.source)
    }
}

#[derive(Debug, Error)]
pub enum PushError {
    #[error(transparent)]
    Descriptor(#[from] DescriptorError),

    #[error("{} of {attempted} image reference(s) failed to push: {}", .failures.len(), join_failures(.failures))]
    Aggregate {
        failures: Vec<PushFailure>,
        attempted: usize,
    },
}

impl PushError {
    pub fn failures(&self) -> &[PushFailure] {
        match self {
            PushError::Aggregate { failures, .. } => failures,
            PushError::Descriptor(_) => &[],
        }
    }
}

fn join_failures(failures: &[PushFailure]) -> String {
    failures
        .iter()
        .map(|f| f.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Registry authentication failures.
///
/// Login failures carry only the exit status: the command line holds the
/// password and must not end up in error output.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    #[error("Registry login failed for {registry} (exit status {})", display_status(.status))]
    LoginFailed {
        registry: String,
        status: Option<i32>,
    },

    #[error("Registry logout failed for {registry}: {source}")]
    LogoutFailed {
        registry: String,
        #[source]
        source: CommandError,
    },
}

fn display_status(status: &Option<i32>) -> String {
    status.map_or_else(|| "unknown".to_string(), |code| code.to_string())
}

pub type DescriptorResult<T> = std::result::Result<T, DescriptorError>;
pub type BuildResult<T> = std::result::Result<T, BuildError>;
pub type PushResult<T> = std::result::Result<T, PushError>;
