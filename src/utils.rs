// ABOUTME: Utility functions for the slidesmith library
// ABOUTME: Provides file validation, directory creation and atomic writes for saved decks

use crate::errors::{Result, SlideError};
use log::warn;
use std::path::Path;

/// Validate that a file exists
pub fn validate_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(SlideError::PathNotFoundError(path.to_path_buf()));
    }
    if !path.is_file() {
        return Err(SlideError::InvalidArgument(format!(
            "Path is not a file: {:?}",
            path
        )));
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    if !path.exists() {
        std::fs::create_dir_all(path).map_err(SlideError::FileReadError)?;
    } else if !path.is_dir() {
        return Err(SlideError::InvalidArgument(format!(
            "Path exists but is not a directory: {:?}",
            path
        )));
    }
    Ok(())
}

/// Ensure a file's parent directory exists
pub fn ensure_parent_directory_exists(file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        ensure_directory_exists(parent)?;
    }
    Ok(())
}

/// Write bytes next to the destination and rename into place, so a failed
/// save never leaves a truncated deck behind.
pub fn write_file_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent_directory_exists(path)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| SlideError::InvalidArgument(format!("Not a file path: {:?}", path)))?;
    let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

    if let Err(e) = std::fs::write(&tmp, bytes) {
        if let Err(cleanup) = std::fs::remove_file(&tmp) {
            warn!("Failed to clean up temp file {:?}: {}", tmp, cleanup);
        }
        return Err(SlideError::FileReadError(e));
    }
    std::fs::rename(&tmp, path).map_err(|e| {
        if let Err(cleanup) = std::fs::remove_file(&tmp) {
            warn!("Failed to clean up temp file {:?}: {}", tmp, cleanup);
        }
        SlideError::FileReadError(e)
    })
}

/// Lowercased file extension, if any.
pub fn file_extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}
