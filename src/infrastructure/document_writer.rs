//! Export document persistence.
//!
//! The rendered document is written to a sibling temporary file and renamed
//! over the target, so a failed run never leaves a truncated file.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::domain::{AppError, Result};

/// Writes the rendered document `content` to `path`.
///
/// # Errors
/// Returns `AppError::Write` if writing or renaming fails.
pub fn write_document(path: &Path, content: &str) -> Result<()> {
    let tmp = temp_path(path);
    if let Err(e) = write_all(&tmp, content.as_bytes()) {
        let _ = fs::remove_file(&tmp);
        return Err(AppError::write(path, e));
    }

    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        AppError::write(path, e)
    })?;

    tracing::info!(path = %path.display(), bytes = content.len(), "Export written");
    Ok(())
}

fn write_all(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(std::ffi::OsStr::to_os_string)
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}
