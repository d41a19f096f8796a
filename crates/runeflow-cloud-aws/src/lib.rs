//! RuneFlow AWS plugins
//!
//! - [`credentials`]: `eb-cli` profile in `~/.aws/config`
//! - [`s3`]: list and download through the aws CLI container
//! - [`beanstalk`]: branch-mapped Elastic Beanstalk deploys

pub mod beanstalk;
pub mod credentials;
pub mod error;
pub mod s3;

pub use beanstalk::{DEFAULT_TIMEOUT_MINUTES, EB_IMAGE, ElasticBeanstalk, aws_volume, resolve_pattern};
pub use credentials::AwsCredentials;
pub use error::{AwsError, Result};
pub use s3::{S3_IMAGE, S3Handler};
