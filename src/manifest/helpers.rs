//! Manifest discovery.
//!
//! Locates `featgate.toml` when no explicit path is configured, by walking up
//! the directory tree from a starting point (default: the current working
//! directory). This mirrors Cargo, Git, and NPM project-file discovery and
//! deliberately avoids anything cleverer: the manifest is wherever the
//! project root is, and reaching the filesystem root without finding one is
//! simply [`Error::ManifestNotFound`].

use std::path::PathBuf;

use crate::constants::MANIFEST_FILE_NAME;
use crate::core::{Error, Result};

/// Find the manifest by searching up from the current working directory.
///
/// # Errors
///
/// [`Error::Io`] if the current directory cannot be determined, or
/// [`Error::ManifestNotFound`] if the search reaches the filesystem root.
pub fn find_manifest() -> Result<PathBuf> {
    let current = std::env::current_dir()?;
    find_manifest_from(current)
}

/// Find the manifest by searching up from a specific starting directory.
///
/// Checks for `featgate.toml` in `start`, then in each parent directory,
/// returning the first hit.
///
/// # Errors
///
/// [`Error::ManifestNotFound`] if no manifest exists between `start` and the
/// filesystem root.
pub fn find_manifest_from(mut start: PathBuf) -> Result<PathBuf> {
    loop {
        let manifest_path = start.join(MANIFEST_FILE_NAME);
        if manifest_path.exists() {
            return Ok(manifest_path);
        }

        if !start.pop() {
            return Err(Error::ManifestNotFound);
        }
    }
}

/// Find the manifest using an explicit path or directory search.
///
/// Uses the explicit path if provided (it must exist), otherwise searches up
/// from the current working directory.
///
/// # Errors
///
/// [`Error::ManifestNotFound`] if the explicit path does not exist, or if no
/// explicit path was given and the search found nothing.
pub fn find_manifest_with_optional(explicit_path: Option<PathBuf>) -> Result<PathBuf> {
    match explicit_path {
        Some(path) => {
            if path.exists() {
                Ok(path)
            } else {
                Err(Error::ManifestNotFound)
            }
        }
        None => find_manifest(),
    }
}
