//! Manifest persistence.
//!
//! The manifest is written to a temporary file in the target directory and
//! renamed over `metadata.json`, so readers see either the previous
//! descriptor or the new one in full, never a merge or a torn write.
//!
//! Both [`persist`] and [`load`] do blocking filesystem I/O. Async callers
//! run them through `tokio::task::spawn_blocking`.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::ManifestError;

use super::Manifest;

/// Well-known manifest file name inside a tile-set directory.
pub const MANIFEST_FILE_NAME: &str = "metadata.json";

/// Location of the manifest for a tile-set directory.
pub fn manifest_path(dir: &Path) -> PathBuf {
    dir.join(MANIFEST_FILE_NAME)
}

/// Atomically write `manifest` to `<dir>/metadata.json`, replacing any
/// existing file.
///
/// Returns the path written.
pub fn persist(manifest: &Manifest, dir: &Path) -> Result<PathBuf, ManifestError> {
    let path = manifest_path(dir);
    let json =
        serde_json::to_vec_pretty(manifest).map_err(|e| ManifestError::Json(e.to_string()))?;

    let mut file = NamedTempFile::new_in(dir).map_err(|e| io_error(dir, e))?;
    file.write_all(&json).map_err(|e| io_error(file.path(), e))?;
    file.as_file().sync_all().map_err(|e| io_error(file.path(), e))?;
    file.persist(&path).map_err(|e| io_error(&path, e.error))?;

    debug!(
        "Wrote manifest {} ({} chunks, format {})",
        path.display(),
        manifest.len(),
        manifest.format
    );
    Ok(path)
}

/// Read and validate the manifest in `dir`.
pub fn load(dir: &Path) -> Result<Manifest, ManifestError> {
    let path = manifest_path(dir);
    let bytes = std::fs::read(&path).map_err(|e| io_error(&path, e))?;
    let manifest: Manifest =
        serde_json::from_slice(&bytes).map_err(|e| ManifestError::Json(e.to_string()))?;
    manifest.validate()?;
    Ok(manifest)
}

fn io_error(path: &Path, err: std::io::Error) -> ManifestError {
    ManifestError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
