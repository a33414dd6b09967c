//! Scan orchestration: walk, hash, classify, persist, report.
//!
//! # Overview
//!
//! [`DuplicateFinder::scan`] runs the whole pipeline for one root:
//! 1. **Setup**: validate the algorithm, check the root, truncate the list
//! 2. **Walk**: enumerate candidates sequentially
//! 3. **Hash**: fan out to the [`WorkerPool`]
//! 4. **Detect**: classify results on the calling thread
//! 5. **Report**: optional JSON report and summary lines
//!
//! Only setup failures abort a scan. Per-file problems are reported on the
//! progress stream and counted.
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::duplicates::{DuplicateFinder, FinderConfig};
//! use dupesweep::progress::ConsoleSink;
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default().with_algorithm("blake3"));
//! let report = finder.scan(Path::new("."), &ConsoleSink::new(false)).unwrap();
//! println!("{} duplicates, {} MiB reclaimable", report.duplicate_count(), report.saved_mib());
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use super::detector::{DetectionStats, DuplicateDetector};
use super::pool::{PoolError, WorkerPool, DEFAULT_MAX_CONCURRENCY};
use super::DuplicateRecord;
use crate::output::json::JsonReport;
use crate::output::list::{DuplicateList, ListError, DEFAULT_LIST_PATH};
use crate::progress::ResultSink;
use crate::scanner::{HashAlgorithm, HashError, Hasher, Walker, WalkerConfig};

/// Configuration for a scan.
#[derive(Debug, Clone)]
pub struct FinderConfig {
    /// Algorithm identifier; validated when the scan starts
    pub algorithm: String,
    /// Maximum simultaneous hash computations
    pub max_concurrency: usize,
    /// Walker filters
    pub walker_config: WalkerConfig,
    /// Where the duplicate list is written
    pub list_path: PathBuf,
    /// Where the JSON report is written, if requested
    pub report_path: Option<PathBuf>,
    /// Hash small files first
    pub sort_by_size: bool,
    /// Optional shutdown flag for graceful termination
    pub shutdown_flag: Option<Arc<AtomicBool>>,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default().name().to_string(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            walker_config: WalkerConfig::default(),
            list_path: PathBuf::from(DEFAULT_LIST_PATH),
            report_path: None,
            sort_by_size: true,
            shutdown_flag: None,
        }
    }
}

impl FinderConfig {
    /// Set the algorithm identifier.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.algorithm = algorithm.into();
        self
    }

    /// Set the concurrency cap (zero is treated as one).
    #[must_use]
    pub fn with_max_concurrency(mut self, workers: usize) -> Self {
        self.max_concurrency = workers.max(1);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the duplicate list location.
    #[must_use]
    pub fn with_list_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.list_path = path.into();
        self
    }

    /// Request a JSON report at `path`.
    #[must_use]
    pub fn with_report_path(mut self, path: Option<PathBuf>) -> Self {
        self.report_path = path;
        self
    }

    /// Enable or disable small-files-first ordering.
    #[must_use]
    pub fn with_size_ordering(mut self, enabled: bool) -> Self {
        self.sort_by_size = enabled;
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Scan-level failures. Everything else is per file and non-fatal.
#[derive(Debug, Error)]
pub enum FinderError {
    /// The algorithm identifier is not supported.
    #[error(transparent)]
    UnsupportedAlgorithm(HashError),

    /// The provided path does not exist.
    #[error("Directory does not exist: {0}")]
    RootNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The duplicate list could not be created or written.
    #[error(transparent)]
    Persistence(#[from] ListError),

    /// The hashing pool could not be started.
    #[error(transparent)]
    Pool(#[from] PoolError),
}

impl FinderError {
    /// True for a missing or non-directory root, which the CLI treats as a
    /// reported condition rather than a failure.
    #[must_use]
    pub fn is_missing_root(&self) -> bool {
        matches!(self, Self::RootNotFound(_) | Self::NotADirectory(_))
    }
}

/// Result of a completed scan.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Root that was scanned
    pub root: PathBuf,
    /// Algorithm used
    pub algorithm: HashAlgorithm,
    /// Candidate files discovered by the walker
    pub files_found: usize,
    /// Detector counters
    pub stats: DetectionStats,
    /// Duplicates in classification order
    pub records: Vec<DuplicateRecord>,
    /// Where the duplicate list was written
    pub list_path: PathBuf,
    /// Where the JSON report was written, if it was
    pub report_path: Option<PathBuf>,
    /// Time spent walking
    pub walk_duration: Duration,
    /// Time spent hashing and classifying
    pub hash_duration: Duration,
    /// Whether the scan was cut short by a shutdown request
    pub interrupted: bool,
}

impl ScanReport {
    fn empty(root: &Path, algorithm: HashAlgorithm, list_path: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            algorithm,
            files_found: 0,
            stats: DetectionStats::default(),
            records: Vec::new(),
            list_path: list_path.to_path_buf(),
            report_path: None,
            walk_duration: Duration::ZERO,
            hash_duration: Duration::ZERO,
            interrupted: false,
        }
    }

    /// Number of files classified as duplicates.
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.stats.duplicates
    }

    /// Bytes that removing the duplicates would free.
    #[must_use]
    pub fn bytes_saved(&self) -> u64 {
        self.stats.bytes_saved
    }

    /// Bytes saved in whole mebibytes (truncated).
    #[must_use]
    pub fn saved_mib(&self) -> u64 {
        self.stats.saved_mib()
    }

    /// Whether any file failed to hash.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.stats.hash_errors > 0
    }
}

/// Drives the scan pipeline.
#[derive(Debug, Clone, Default)]
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Scan `root` for duplicates, reporting to `sink`.
    ///
    /// # Errors
    ///
    /// - [`FinderError::UnsupportedAlgorithm`] before anything is touched
    /// - [`FinderError::RootNotFound`] / [`FinderError::NotADirectory`] after
    ///   reporting the condition on the progress stream; nothing is hashed
    /// - [`FinderError::Persistence`] if the duplicate list cannot be
    ///   created or written
    /// - [`FinderError::Pool`] if the hashing workers cannot start
    pub fn scan(&self, root: &Path, sink: &dyn ResultSink) -> Result<ScanReport, FinderError> {
        let algorithm: HashAlgorithm = self
            .config
            .algorithm
            .parse()
            .map_err(FinderError::UnsupportedAlgorithm)?;

        if !root.exists() {
            sink.on_progress(&format!("Directory does not exist: {}", root.display()));
            return Err(FinderError::RootNotFound(root.to_path_buf()));
        }
        if !root.is_dir() {
            sink.on_progress(&format!("Not a directory: {}", root.display()));
            return Err(FinderError::NotADirectory(root.to_path_buf()));
        }

        log::info!(
            "Starting duplicate scan of {} using {}",
            root.display(),
            algorithm
        );

        // Truncated up front so a stale list never outlives a new scan.
        let list = DuplicateList::create(&self.config.list_path)?;

        let walk_start = Instant::now();
        let mut walker = Walker::new(root, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(Arc::clone(flag));
        }
        let mut files = walker.explore(|dir, found| {
            sink.on_progress(&format!("explored {}, found {} files", dir.display(), found));
        });
        let walk_duration = walk_start.elapsed();

        if self.config.sort_by_size {
            files.sort_by_key(|f| f.size);
        }
        for file in &files {
            sink.on_progress(&format!(
                "Found file: {} (size: {} bytes)",
                file.path.display(),
                file.size
            ));
        }
        sink.on_progress(&format!("Found {} files", files.len()));

        let mut report = ScanReport::empty(root, algorithm, &self.config.list_path);
        report.files_found = files.len();
        report.walk_duration = walk_duration;

        if files.is_empty() {
            list.finish()?;
            report.interrupted = self.config.is_shutdown_requested();
            return Ok(report);
        }

        let hash_start = Instant::now();
        let pool = WorkerPool::new(self.config.max_concurrency)?;
        let stream = pool.run(
            files,
            Hasher::new(algorithm),
            self.config.shutdown_flag.clone(),
        )?;

        sink.on_hash_start(stream.total());
        let outcome = DuplicateDetector::new(list, sink).consume(stream);
        sink.on_hash_end();
        let outcome = outcome?;

        report.hash_duration = hash_start.elapsed();
        report.stats = outcome.stats;
        report.records = outcome.records;
        report.interrupted = self.config.is_shutdown_requested();

        if report.stats.cancelled > 0 {
            sink.on_progress(&format!(
                "Scan interrupted: {} files were not hashed",
                report.stats.cancelled
            ));
        }

        if let Some(ref path) = self.config.report_path {
            match JsonReport::new(&report.records).write_to(path) {
                Ok(()) => {
                    sink.on_progress(&format!("Wrote {}", path.display()));
                    report.report_path = Some(path.clone());
                }
                Err(e) => {
                    log::warn!("Failed to write report {}: {}", path.display(), e);
                    sink.on_progress(&format!("Failed to create {}: {}", path.display(), e));
                }
            }
        }

        sink.on_progress(&format!("Total duplicate files: {}", report.duplicate_count()));
        sink.on_progress(&format!("Potential space to save: {}MB", report.saved_mib()));
        if report.has_errors() {
            sink.on_progress(&format!("Hash errors: {}", report.stats.hash_errors));
        }

        log::info!(
            "Scan complete: {} files, {} duplicates, {} errors in {:.2?}",
            report.files_found,
            report.duplicate_count(),
            report.stats.hash_errors,
            walk_duration + report.hash_duration
        );

        Ok(report)
    }
}
