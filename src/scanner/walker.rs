//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory
//! tree and collecting the non-empty regular files that are candidates for
//! duplicate detection.
//!
//! The walk is sequential and runs to completion before hashing starts.
//! Directories are visited contents-first, so a directory is reported only
//! after its whole subtree has been enumerated; the reported count includes
//! every file found below it.
//!
//! # Features
//!
//! - Zero-byte files are always skipped
//! - Optional size and hidden-file filters
//! - Symlinks are skipped unless `follow_symlinks` is set; when followed,
//!   each underlying file is collected once (keyed on device and inode)
//! - Unreadable subdirectories are skipped, never fatal
//! - Graceful shutdown via atomic flag
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! let files = walker.explore(|dir, found| {
//!     println!("explored {}, found {} files", dir.display(), found);
//! });
//! println!("{} candidates", files.len());
//! ```

use std::collections::{HashMap, HashSet};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use walkdir::{DirEntry, WalkDir};

use super::{FileRecord, WalkerConfig};

/// Remembers the files already collected so that a followed symlink and
/// its target are not both handed to the hasher.
#[derive(Debug, Default)]
struct SeenFiles {
    #[cfg_attr(not(unix), allow(dead_code))]
    seen: HashSet<(u64, u64)>,
}

impl SeenFiles {
    /// Record the file; returns false if it was already collected.
    #[cfg(unix)]
    fn insert(&mut self, metadata: &Metadata) -> bool {
        use std::os::unix::fs::MetadataExt;
        self.seen.insert((metadata.dev(), metadata.ino()))
    }

    #[cfg(not(unix))]
    fn insert(&mut self, _metadata: &Metadata) -> bool {
        true
    }
}

/// Directory walker for file discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
    /// Optional shutdown flag for graceful termination
    shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
            shutdown_flag: None,
        }
    }

    /// Set the shutdown flag for graceful termination.
    ///
    /// When the flag is set to `true`, the walker stops at the next entry
    /// and returns what it has found so far.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Check if shutdown has been requested.
    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }

    /// Check if a file passes size filters.
    fn passes_size_filter(&self, size: u64) -> bool {
        if size == 0 {
            return false;
        }
        if let Some(min) = self.config.min_size {
            if size < min {
                return false;
            }
        }
        if let Some(max) = self.config.max_size {
            if size > max {
                return false;
            }
        }
        true
    }

    /// True if any component below the root starts with `.`.
    ///
    /// Checked on the relative path because contents-first traversal yields
    /// a directory's children before the directory itself.
    fn is_hidden(&self, path: &Path) -> bool {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .components()
            .any(|c| c.as_os_str().to_str().is_some_and(|name| name.starts_with('.')))
    }

    /// Walk the tree and collect every candidate file.
    ///
    /// `on_dir` is called once per directory after its subtree has been
    /// enumerated, with the number of candidate files found in it
    /// (including subdirectories). Errors are logged and skipped.
    pub fn explore<F>(&self, mut on_dir: F) -> Vec<FileRecord>
    where
        F: FnMut(&Path, usize),
    {
        let walk = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .contents_first(true)
            .sort_by_file_name();

        let mut files = Vec::new();
        let mut seen = SeenFiles::default();
        // Files found so far below each directory that has not been reported yet.
        let mut pending: HashMap<PathBuf, usize> = HashMap::new();

        for entry_result in walk {
            if self.is_shutdown_requested() {
                log::debug!("Walker: Shutdown requested, stopping iteration");
                break;
            }

            let entry = match entry_result {
                Ok(entry) => entry,
                Err(e) => {
                    log::debug!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };

            if self.config.skip_hidden && self.is_hidden(entry.path()) {
                log::trace!("Skipping hidden entry: {}", entry.path().display());
                continue;
            }

            let file_type = entry.file_type();

            if file_type.is_dir() {
                let found = pending.remove(entry.path()).unwrap_or(0);
                on_dir(entry.path(), found);
                continue;
            }

            if file_type.is_symlink() {
                log::trace!("Skipping symlink: {}", entry.path().display());
                continue;
            }

            if let Some(record) = self.process_file_entry(&entry, &mut seen) {
                for ancestor in record
                    .path
                    .ancestors()
                    .skip(1)
                    .take_while(|a| a.starts_with(&self.root))
                {
                    *pending.entry(ancestor.to_path_buf()).or_insert(0) += 1;
                }
                files.push(record);
            }
        }

        log::debug!(
            "Walker: {} candidate files under {}",
            files.len(),
            self.root.display()
        );
        files
    }

    /// Build a FileRecord for a regular file that passes the filters.
    fn process_file_entry(&self, entry: &DirEntry, seen: &mut SeenFiles) -> Option<FileRecord> {
        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => {
                log::debug!("Cannot read metadata for {}: {}", entry.path().display(), e);
                return None;
            }
        };

        if !metadata.is_file() {
            return None;
        }

        let size = metadata.len();
        if !self.passes_size_filter(size) {
            log::trace!("Skipping file by size ({}): {}", size, entry.path().display());
            return None;
        }

        // Only a followed link can reach a file twice.
        if self.config.follow_symlinks && !seen.insert(&metadata) {
            log::trace!("Skipping already collected file: {}", entry.path().display());
            return None;
        }

        Some(FileRecord::new(entry.path().to_path_buf(), size))
    }
}
