//! Deletion phase driven by the persisted duplicate list.
//!
//! # Overview
//!
//! Deletion is decoupled from scanning: it reads only the list file, which
//! may be stale by the time it runs. Each path is handled independently:
//! - Removal succeeds: counted as removed
//! - File already gone, permission denied, anything else: counted as
//!   skipped and reported, the batch continues
//!
//! The only failure that stops the phase is a list that cannot be read.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::actions::delete::{delete_from_list, DeleteConfig};
//! use dupesweep::progress::ConsoleDeleteReporter;
//! use std::path::Path;
//!
//! let result = delete_from_list(
//!     Path::new("duplicate_files.txt"),
//!     &DeleteConfig::default(),
//!     Some(&ConsoleDeleteReporter),
//! )
//! .unwrap();
//! println!("{}", result.summary());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::output::list::{read_list, ListError};

/// Error type for deletion operations.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (already deleted or moved since the scan).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The duplicate list itself could not be read.
    #[error("could not open duplicate list: {0}")]
    ListUnreadable(#[source] ListError),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed { path: PathBuf, message: String },

    /// General I/O error.
    #[error("I/O error for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Get the path associated with this error (if any).
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::TrashFailed { path: p, .. }
            | Self::Io { path: p, .. } => Some(p),
            Self::ListUnreadable(_) => None,
        }
    }
}

/// How files are removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeleteMode {
    /// Remove from the filesystem.
    #[default]
    Permanent,
    /// Move to the platform trash.
    Trash,
}

/// Configuration for deletion operations.
#[derive(Debug, Clone, Default)]
pub struct DeleteConfig {
    /// Removal mode
    pub mode: DeleteMode,
}

impl DeleteConfig {
    /// Config for permanent removal.
    #[must_use]
    pub fn permanent() -> Self {
        Self {
            mode: DeleteMode::Permanent,
        }
    }

    /// Config for moving files to the trash.
    #[must_use]
    pub fn trash() -> Self {
        Self {
            mode: DeleteMode::Trash,
        }
    }
}

/// Result of a successful deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    /// Path that was deleted.
    pub path: PathBuf,
    /// Size of the deleted file in bytes.
    pub size: u64,
    /// Removal mode used.
    pub mode: DeleteMode,
}

/// Tally of a batch deletion.
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteResult {
    /// Successfully deleted files.
    pub successes: Vec<DeleteResult>,
    /// Skipped paths with the reason.
    pub failures: Vec<(PathBuf, String)>,
    /// Total bytes freed.
    pub bytes_freed: u64,
}

impl BatchDeleteResult {
    /// Number of files removed.
    #[must_use]
    pub fn removed(&self) -> usize {
        self.successes.len()
    }

    /// Number of paths skipped.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.failures.len()
    }

    /// Total number of paths attempted.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.removed() + self.skipped()
    }

    /// Check if every path was removed.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Final tally line.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Deletion complete: removed {}, skipped {}",
            self.removed(),
            self.skipped()
        )
    }
}

/// Callback trait for deletion progress reporting.
pub trait DeleteProgressCallback: Send + Sync {
    /// Called before each file deletion.
    fn on_before_delete(&self, path: &Path, index: usize, total: usize);

    /// Called after successful deletion.
    fn on_delete_success(&self, path: &Path, size: u64);

    /// Called after a path was skipped.
    fn on_delete_failure(&self, path: &Path, error: &str);

    /// Called when the batch completes.
    fn on_complete(&self, result: &BatchDeleteResult);
}

/// Callback that reports nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl DeleteProgressCallback for NoProgress {
    fn on_before_delete(&self, _path: &Path, _index: usize, _total: usize) {}
    fn on_delete_success(&self, _path: &Path, _size: u64) {}
    fn on_delete_failure(&self, _path: &Path, _error: &str) {}
    fn on_complete(&self, _result: &BatchDeleteResult) {}
}

/// Permanently delete a single file.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if deletion is not allowed
/// - `Io` for anything else
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::symlink_metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?
        .len();

    fs::remove_file(path).map_err(|e| {
        log::debug!("Permanent delete failed for {}: {}", path.display(), e);
        DeleteError::from_io(path, e)
    })?;

    log::debug!("Permanently deleted: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        mode: DeleteMode::Permanent,
    })
}

/// Move a single file to the system trash.
///
/// # Errors
///
/// - `NotFound` if the file doesn't exist
/// - `PermissionDenied` if its metadata cannot be read
/// - `TrashFailed` if the trash operation fails
pub fn delete_to_trash(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = fs::symlink_metadata(path)
        .map_err(|e| DeleteError::from_io(path, e))?
        .len();

    trash::delete(path).map_err(|e| {
        log::debug!("Trash operation failed for {}: {}", path.display(), e);
        DeleteError::TrashFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;

    log::debug!("Moved to trash: {} ({} bytes)", path.display(), size);

    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        mode: DeleteMode::Trash,
    })
}

/// Delete each path independently, continuing past failures.
pub fn delete_batch<C: DeleteProgressCallback + ?Sized>(
    paths: &[PathBuf],
    config: &DeleteConfig,
    callback: Option<&C>,
) -> BatchDeleteResult {
    let mut result = BatchDeleteResult::default();
    let total = paths.len();

    for (index, path) in paths.iter().enumerate() {
        if let Some(cb) = callback {
            cb.on_before_delete(path, index, total);
        }

        let outcome = match config.mode {
            DeleteMode::Permanent => permanent_delete(path),
            DeleteMode::Trash => delete_to_trash(path),
        };

        match outcome {
            Ok(del) => {
                result.bytes_freed += del.size;
                if let Some(cb) = callback {
                    cb.on_delete_success(path, del.size);
                }
                result.successes.push(del);
            }
            Err(e) => {
                let reason = e.to_string();
                log::debug!("Skipping {}: {}", path.display(), reason);
                if let Some(cb) = callback {
                    cb.on_delete_failure(path, &reason);
                }
                result.failures.push((path.clone(), reason));
            }
        }
    }

    if let Some(cb) = callback {
        cb.on_complete(&result);
    }

    log::info!("{} ({} bytes freed)", result.summary(), result.bytes_freed);

    result
}

/// Run the deletion phase against a persisted duplicate list.
///
/// Blank lines are ignored and surrounding whitespace is trimmed.
///
/// # Errors
///
/// Returns [`DeleteError::ListUnreadable`] if the list cannot be opened or
/// read. Per-path failures never surface here.
pub fn delete_from_list<C: DeleteProgressCallback + ?Sized>(
    list_path: &Path,
    config: &DeleteConfig,
    callback: Option<&C>,
) -> Result<BatchDeleteResult, DeleteError> {
    let paths = read_list(list_path).map_err(DeleteError::ListUnreadable)?;
    log::info!(
        "Deleting {} listed duplicates from {} ({:?})",
        paths.len(),
        list_path.display(),
        config.mode
    );
    Ok(delete_batch(&paths, config, callback))
}
