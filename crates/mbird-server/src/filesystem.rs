//! Directory listings for the project location browser

use std::path::{Path, PathBuf};

use mbird_core::{DirectoryEntry, DirectoryListing, home_dir};

use crate::error::ApiError;

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix('~') {
        Some("") => home_dir(),
        Some(rest) if rest.starts_with('/') => home_dir().join(&rest[1..]),
        _ => PathBuf::from(path),
    }
}

/// List the visible subdirectories of `path`, sorted by name.
///
/// Files and dot-entries are skipped. A directory that cannot be read
/// yields an empty listing rather than an error.
pub fn list_directories(path: &str) -> Result<DirectoryListing, ApiError> {
    let requested = expand_home(path);
    if !requested.exists() {
        return Err(ApiError::not_found("Directory not found"));
    }
    let dir = requested
        .canonicalize()
        .map_err(|e| ApiError::internal(e.to_string()))?;
    if !dir.is_dir() {
        return Err(ApiError::bad_request("Not a directory"));
    }

    let mut directories = Vec::new();
    match std::fs::read_dir(&dir) {
        Ok(entries) => {
            for entry in entries.flatten() {
                let name = entry.file_name().to_string_lossy().to_string();
                let entry_path = entry.path();
                if name.starts_with('.') || !entry_path.is_dir() {
                    continue;
                }
                directories.push(DirectoryEntry {
                    name,
                    path: display(&entry_path),
                });
            }
        }
        Err(e) => {
            tracing::debug!("Cannot read {}: {}", dir.display(), e);
        }
    }
    directories.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(DirectoryListing {
        current: display(&dir),
        parent: dir.parent().map(display),
        directories,
    })
}

fn display(path: &Path) -> String {
    path.display().to_string()
}
