//! Owner-only credential files with backup of the previous version.

use crate::error::CredentialFileError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes `content` to `path` with mode 600.
///
/// The parent directory is created if missing. An existing file is renamed
/// to `<path>_old` first. Returns the backup path when one was made.
pub fn write_credential_file(
    path: &Path,
    content: &str,
) -> Result<Option<PathBuf>, CredentialFileError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        fs::create_dir_all(parent).map_err(|source| CredentialFileError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let backup = if path.exists() {
        let mut backup_name = path.as_os_str().to_owned();
        backup_name.push("_old");
        let backup = PathBuf::from(backup_name);

        tracing::warn!(
            "Backing up existing {} as {}",
            path.display(),
            backup.display()
        );
        fs::rename(path, &backup).map_err(|source| CredentialFileError::Backup {
            path: path.to_path_buf(),
            source,
        })?;
        Some(backup)
    } else {
        None
    };

    let write_err = |source| CredentialFileError::Write {
        path: path.to_path_buf(),
        source,
    };
    let mut file = open_owner_only(path).map_err(write_err)?;
    file.write_all(content.as_bytes()).map_err(write_err)?;

    Ok(backup)
}

#[cfg(unix)]
fn open_owner_only(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;

    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_owner_only(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}
