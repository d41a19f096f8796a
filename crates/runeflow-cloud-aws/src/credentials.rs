use crate::error::{AwsError, Result};
use runeflow_config::Settings;
use runeflow_core::{require_credential, write_credential_file};
use std::path::{Path, PathBuf};

/// Profile read by the eb-cli container.
pub const PROFILE: &str = "eb-cli";

/// AWS access keys written as an `eb-cli` profile.
pub struct AwsCredentials {
    access_key_id: String,
    secret_access_key: String,
    user_folder: PathBuf,
}

impl AwsCredentials {
    /// Explicit values first, then `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`.
    /// The folder defaults to `~/.aws`.
    pub fn new(
        access_key_id: Option<&str>,
        secret_access_key: Option<&str>,
        user_folder: Option<&Path>,
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

        let user_folder = match user_folder {
            Some(folder) => folder.to_path_buf(),
            None => settings
                .home()
                .map(|home| home.join(".aws"))
                .ok_or(AwsError::NoHomeDirectory)?,
        };

        Ok(Self {
            access_key_id,
            secret_access_key,
            user_folder,
        })
    }

    pub fn config_path(&self) -> PathBuf {
        self.user_folder.join("config")
    }

    pub fn render(&self) -> String {
        format!(
            "[profile {}]\naws_access_key_id={}\naws_secret_access_key={}\n",
            PROFILE, self.access_key_id, self.secret_access_key
        )
    }

    /// Writes `<user_folder>/config`, backing up an existing file.
    pub fn create_credentials(&self) -> Result<PathBuf> {
        tracing::info!("Creating AWS credential file...");
        let path = self.config_path();
        write_credential_file(&path, &self.render())?;
        tracing::info!("AWS credential file created: {}", path.display());
        Ok(path)
    }
}
