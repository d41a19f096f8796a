use crate::error::{AwsError, Result};
use runeflow_config::Settings;
use runeflow_core::{CommandOutput, ContainerProvider, require_credential, shell_quote};

/// Image providing the `aws` CLI.
pub const S3_IMAGE: &str = "garland/aws-cli-docker";

/// S3 access through the aws CLI running in a container.
pub struct S3Handler<C> {
    container: C,
}

impl<C: ContainerProvider> S3Handler<C> {
    /// Injects the access keys into `container`. Explicit values first, then
    /// `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`.
    pub fn new(
        mut container: C,
        access_key_id: Option<&str>,
        secret_access_key: Option<&str>,
        settings: &Settings,
    ) -> Result<Self> {
        let access_key_id = require_credential(
            access_key_id,
            settings.aws.access_key_id.as_deref(),
            "AWS access key id",
            "AWS_ACCESS_KEY_ID",
        )?;
        let secret_access_key = require_credential(
            secret_access_key,
            settings.aws.secret_access_key.as_deref(),
            "AWS secret access key",
            "AWS_SECRET_ACCESS_KEY",
        )?;

        container.add_environment_variable("AWS_ACCESS_KEY_ID", &access_key_id)?;
        container.add_environment_variable("AWS_SECRET_ACCESS_KEY", &secret_access_key)?;
        Ok(Self { container })
    }

    /// `aws s3 ls <bucket>`
    pub async fn list(&self, bucket: &str) -> Result<CommandOutput> {
        let output = self
            .container
            .run(
                &format!("aws s3 ls {}", shell_quote(bucket)),
                &format!("Listing bucket {}", bucket),
            )
            .await?;
        Ok(output)
    }

    /// `aws s3 cp <uri> <target>`; the target defaults to `./<last segment>`.
    pub async fn get(&self, uri: &str, target: Option<&str>) -> Result<String> {
        let target = match target {
            Some(target) => target.to_string(),
            None => default_target(uri)?,
        };
        if !uri.starts_with("s3://") {
            return Err(AwsError::InvalidS3Uri(uri.to_string()));
        }

        tracing::info!("Downloading file from {} to {}", uri, target);
        self.container
            .run(
                &format!("aws s3 cp {} {}", shell_quote(uri), shell_quote(&target)),
                "",
            )
            .await?;
        Ok(target)
    }
}

/// `./<last path segment>` of an `s3://` URI.
pub fn default_target(uri: &str) -> Result<String> {
    let key = uri
        .strip_prefix("s3://")
        .ok_or_else(|| AwsError::InvalidS3Uri(uri.to_string()))?;
    let segment = key.rsplit('/').next().unwrap_or_default();
    Ok(format!("./{}", segment))
}
