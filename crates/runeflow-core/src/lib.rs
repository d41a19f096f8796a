//! RuneFlow core collaborators
//!
//! Narrow capabilities shared by every plugin crate:
//!
//! - [`CommandRunner`]: runs an external command line, failing on non-zero exit
//! - [`ParameterProvider`]: environment-derived defaults (project, branch, commit)
//! - [`ContainerProvider`]: runs commands inside a throwaway container
//! - [`strings`]: image-name normalization
//! - [`credentials`]: explicit-then-settings credential sourcing
//! - [`credential_file`]: owner-only credential files with backup

pub mod container;
pub mod credential_file;
pub mod credentials;
pub mod error;
pub mod params;
pub mod runner;
pub mod strings;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use container::{ContainerProvider, DockerContainer};
pub use credential_file::write_credential_file;
pub use credentials::require_credential;
pub use error::{CommandError, ContainerError, CredentialFileError, CredentialsError, Result};
pub use params::{ParameterKey, ParameterProvider, StaticParameters};
pub use runner::{CommandOutput, CommandRunner, ShellRunner};
pub use strings::{is_normalized, normalize, shell_quote};
