//! File permission helpers for settings files
//!
//! Settings may hold credentials or machine-specific paths, so the files a
//! provider writes are owner-only on Unix. Elsewhere these are no-ops.

use crate::error::{Error, Result};
use std::path::Path;

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = std::fs::metadata(path)
        .map_err(|e| Error::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?
        .permissions();
    perms.set_mode(mode);

    std::fs::set_permissions(path, perms).map_err(|e| Error::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Restrict a file to owner read/write (Unix: 0o600)
///
/// # Errors
///
/// Returns an I/O error if the permissions cannot be read or changed.
pub fn set_secure_file_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    set_mode(path, 0o600)?;
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

/// Create a directory (and parents) restricted to its owner (Unix: 0o700)
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be created or secured.
pub fn ensure_secure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| Error::DirectoryCreate {
        path: path.to_path_buf(),
        source: e,
    })?;

    #[cfg(unix)]
    set_mode(path, 0o700)?;

    Ok(())
}
