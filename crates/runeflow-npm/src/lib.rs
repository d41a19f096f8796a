//! RuneFlow npm plugin
//!
//! Writes the `.npmrc` auth token entry used by `npm publish` in CI.

use runeflow_config::Settings;
use runeflow_core::{CredentialFileError, CredentialsError, require_credential, write_credential_file};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_REGISTRY_URL: &str = "registry.npmjs.org/";

#[derive(Debug, Error)]
pub enum NpmError {
    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    #[error(transparent)]
    CredentialFile(#[from] CredentialFileError),

    #[error("Home directory could not be determined; pass a user folder or set HOME")]
    NoHomeDirectory,
}

pub type Result<T> = std::result::Result<T, NpmError>;

pub struct NpmCredentials {
    registry_url: String,
    auth_token: String,
    user_folder: PathBuf,
}

impl NpmCredentials {
    /// Token: explicit, then `NPM_AUTH_TOKEN` (mandatory).
    /// Registry: explicit, then `NPM_REGISTRY_URL`, then `registry.npmjs.org/`.
    /// Folder: explicit, then the home directory.
    pub fn new(
        registry_url: Option<&str>,
        auth_token: Option<&str>,
        user_folder: Option<&Path>,
        settings: &Settings,
    ) -> Result<Self> {
        let auth_token = require_credential(
            auth_token,
            settings.npm.auth_token.as_deref(),
            "npm auth token",
            "NPM_AUTH_TOKEN",
        )?;

        let registry_url = registry_url
            .or(settings.npm.registry_url.as_deref())
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or(DEFAULT_REGISTRY_URL)
            .to_string();

        let user_folder = match user_folder {
            Some(folder) => folder.to_path_buf(),
            None => settings.home().ok_or(NpmError::NoHomeDirectory)?,
        };

        Ok(Self {
            registry_url,
            auth_token,
            user_folder,
        })
    }

    pub fn registry_url(&self) -> &str {
        &self.registry_url
    }

    pub fn npmrc_path(&self) -> PathBuf {
        self.user_folder.join(".npmrc")
    }

    /// `//<registry>:_authToken=<token>`
    pub fn render(&self) -> String {
        let registry = self
            .registry_url
            .trim_start_matches("https://")
            .trim_start_matches("http://")
            .trim_start_matches("//");
        format!("//{}:_authToken={}\n", registry, self.auth_token)
    }

    /// Writes `<folder>/.npmrc`, backing up an existing file to `.npmrc_old`.
    pub fn create_credentials(&self) -> Result<PathBuf> {
        tracing::info!("Creating npm credential file...");
        let path = self.npmrc_path();
        write_credential_file(&path, &self.render())?;
        tracing::info!("npm credential file created: {}", path.display());
        Ok(path)
    }
}
