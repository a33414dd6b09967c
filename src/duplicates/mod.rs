//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Bounded parallel hashing of discovered files ([`pool`])
//! - Single-consumer duplicate classification ([`detector`])
//! - Scan orchestration from walk to report ([`finder`])

pub mod detector;
pub mod finder;
pub mod pool;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::scanner::HashError;

pub use detector::{Classification, DetectionOutcome, DetectionStats, DuplicateDetector};
pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanReport};
pub use pool::{HashStream, PoolError, WorkerPool, DEFAULT_MAX_CONCURRENCY};

/// Outcome of hashing one discovered file.
///
/// Produced exactly once per [`crate::scanner::FileRecord`] by the worker
/// pool and consumed exactly once by the detector.
#[derive(Debug)]
pub struct HashResult {
    /// The file that was hashed
    pub path: PathBuf,
    /// Hex digest, or why it could not be computed
    pub outcome: Result<String, HashError>,
}

impl HashResult {
    /// A successful hash.
    #[must_use]
    pub fn ok(path: PathBuf, digest: String) -> Self {
        Self {
            path,
            outcome: Ok(digest),
        }
    }

    /// A failed hash.
    #[must_use]
    pub fn failed(path: PathBuf, error: HashError) -> Self {
        Self {
            path,
            outcome: Err(error),
        }
    }

    /// The digest, if hashing succeeded and produced one.
    #[must_use]
    pub fn digest(&self) -> Option<&str> {
        self.outcome
            .as_ref()
            .ok()
            .map(String::as_str)
            .filter(|d| !d.is_empty())
    }

    /// The failure, if any.
    #[must_use]
    pub fn error(&self) -> Option<&HashError> {
        self.outcome.as_ref().err()
    }
}

/// A file classified as a duplicate of an earlier-seen original.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DuplicateRecord {
    /// File name component of `path`
    pub name: String,
    /// Path of the duplicate
    pub path: PathBuf,
    /// Size when classified; `None` if the re-stat failed
    pub size: Option<u64>,
    /// Hex digest shared with the original
    pub digest: String,
    /// The first-seen path with the same digest
    pub original: PathBuf,
}

impl DuplicateRecord {
    /// Create a record, deriving `name` from `path`.
    #[must_use]
    pub fn new(path: PathBuf, size: Option<u64>, digest: String, original: PathBuf) -> Self {
        Self {
            name: file_name_of(&path),
            path,
            size,
            digest,
            original,
        }
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
