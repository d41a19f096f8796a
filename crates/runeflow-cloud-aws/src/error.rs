use runeflow_core::{ContainerError, CredentialFileError, CredentialsError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AwsError {
    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    #[error(transparent)]
    CredentialFile(#[from] CredentialFileError),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("Home directory could not be determined; pass a user folder or set HOME")]
    NoHomeDirectory,

    #[error("Invalid S3 URI '{0}': must start with \"s3://\"")]
    InvalidS3Uri(String),

    #[error("Deployment pattern is mandatory: pass it explicitly or set EB_DEPLOYMENT_PATTERN_STRING")]
    MissingPattern,

    #[error("Cannot determine branch name")]
    MissingBranch,

    #[error("No matching environment for branch {branch}")]
    NoMatchingEnvironment { branch: String },
}

pub type Result<T> = std::result::Result<T, AwsError>;
