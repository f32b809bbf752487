//! PHP file collection.
//!
//! Provides workspace file discovery for the CLI: walks directories for
//! `.php` files with deterministic ordering and standard exclusions.

use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;
use walkdir::WalkDir;

/// Directories never descended into.
pub const DEFAULT_EXCLUDES: &[&str] = &[".git", ".svn", "vendor", "node_modules"];

// ============================================================================
// Error Types
// ============================================================================

/// Error type for file operations.
#[derive(Debug, Error)]
pub enum FileError {
    /// Path does not exist.
    #[error("path not found: {path}")]
    NotFound { path: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for file operations.
pub type FileResult<T> = Result<T, FileError>;

// ============================================================================
// File Collection
// ============================================================================

/// Collect PHP files under `root`.
///
/// A file path is returned as-is; a directory is walked recursively for
/// `.php` files, skipping [`DEFAULT_EXCLUDES`]. Results are sorted by
/// path so runs are deterministic.
///
/// Returns `(path, content)` tuples; paths are relative to `root` for
/// directories.
pub fn collect_php_files(root: &Path) -> FileResult<Vec<(String, String)>> {
    if !root.exists() {
        return Err(FileError::NotFound {
            path: root.display().to_string(),
        });
    }
    if root.is_file() {
        let content = fs::read_to_string(root)?;
        return Ok(vec![(root.display().to_string(), content)]);
    }

    let mut files = Vec::new();
    let walker = WalkDir::new(root).sort_by_file_name().into_iter();
    for entry in walker.filter_entry(|e| !is_excluded(e.file_name().to_str())) {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("php") {
            continue;
        }
        let relative = path
            .strip_prefix(root)
            .unwrap_or(path)
            .display()
            .to_string();
        let content = fs::read_to_string(path)?;
        files.push((relative, content));
    }
    Ok(files)
}

fn is_excluded(name: Option<&str>) -> bool {
    name.is_some_and(|n| DEFAULT_EXCLUDES.contains(&n))
}

// ============================================================================
// Tests
// ============================================================================
