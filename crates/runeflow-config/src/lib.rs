//! RuneFlow configuration
//!
//! Builds the immutable [`Settings`] snapshot and the CI parameter set once,
//! at the process boundary. Library crates receive both by value and never
//! read the environment themselves.

pub mod ci;
pub mod error;
pub mod settings;

pub use ci::{CiProvider, ci_parameters, release_version};
pub use error::*;
pub use settings::{AwsSettings, BeanstalkSettings, DockerSettings, NpmSettings, Settings};

use std::path::{Path, PathBuf};

const CONFIG_CANDIDATES: [&str; 2] = ["runeflow.yaml", ".runeflow.yaml"];

/// Locates the optional config file.
///
/// Search order:
/// 1. `explicit` (the `RUNEFLOW_CONFIG` variable), when the file exists
/// 2. current directory: `runeflow.yaml`, `.runeflow.yaml`
/// 3. `<config_dir>/runeflow/config.yaml`
pub fn find_config_file_in(
    explicit: Option<&Path>,
    current_dir: &Path,
    config_dir: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(path) = explicit {
        if path.exists() {
            return Some(path.to_path_buf());
        }
        tracing::warn!("RUNEFLOW_CONFIG points to a missing file: {}", path.display());
    }

    for filename in CONFIG_CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Some(path);
        }
    }

    config_dir
        .map(|dir| dir.join("runeflow").join("config.yaml"))
        .filter(|path| path.exists())
}

/// Reads a YAML settings file.
pub fn read_config_file(path: &Path) -> Result<Settings> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    if content.trim().is_empty() {
        return Ok(Settings::default());
    }

    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads settings from the optional config file, then the environment.
pub fn load_settings() -> Result<Settings> {
    let explicit = std::env::var_os("RUNEFLOW_CONFIG").map(PathBuf::from);
    let current_dir = std::env::current_dir()?;
    let config_dir = dirs::config_dir();

    let base = match find_config_file_in(explicit.as_deref(), &current_dir, config_dir.as_deref()) {
        Some(path) => {
            tracing::debug!("Loading config file: {}", path.display());
            read_config_file(&path)?
        }
        None => Settings::default(),
    };

    Ok(base.overlay_env(|key| std::env::var(key).ok()))
}

/// Parameter set for the current process environment.
pub fn load_parameters() -> runeflow_core::StaticParameters {
    ci_parameters(|key| std::env::var(key).ok())
}
