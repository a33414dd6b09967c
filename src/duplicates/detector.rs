//! Single-consumer duplicate classification.
//!
//! # Overview
//!
//! [`DuplicateDetector`] drains the hash result stream on one thread and
//! owns the digest → first-path table outright. Every method takes
//! `&mut self`, so the table is never shared and never locked; the channel
//! in front of it is the only synchronisation point of the pipeline.
//!
//! The first path seen with a digest becomes its original. Which copy that
//! is depends on hashing order and can differ between runs; the number of
//! duplicates and the bytes they occupy do not.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use super::{DuplicateRecord, HashResult};
use crate::output::list::{DuplicateList, ListError};
use crate::progress::ResultSink;
use crate::scanner::HashError;

/// How a single hash result was classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// First file seen with this digest.
    Original,
    /// Digest already seen; the file was recorded as a duplicate.
    Duplicate(DuplicateRecord),
    /// Hashing failed; the file is not a deduplication candidate.
    Failed,
    /// The scan was cancelled before the file was hashed.
    Cancelled,
}

/// Running totals kept by the detector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionStats {
    /// Results with a usable digest
    pub hashed: usize,
    /// Distinct digests seen
    pub originals: usize,
    /// Files classified as duplicates
    pub duplicates: usize,
    /// Sum of sizes of duplicates whose re-stat succeeded
    pub bytes_saved: u64,
    /// Duplicates whose size could not be determined
    pub unsized_duplicates: usize,
    /// Files whose hash failed
    pub hash_errors: usize,
    /// Files skipped because the scan was cancelled
    pub cancelled: usize,
}

impl DetectionStats {
    /// Bytes saved in whole mebibytes (truncated).
    #[must_use]
    pub fn saved_mib(&self) -> u64 {
        self.bytes_saved / 1024 / 1024
    }
}

/// Classifies hash results and persists duplicate paths.
pub struct DuplicateDetector<'a> {
    table: HashMap<String, PathBuf>,
    list: DuplicateList,
    sink: &'a dyn ResultSink,
    records: Vec<DuplicateRecord>,
    stats: DetectionStats,
}

/// Everything the detector produced once the stream is drained.
#[derive(Debug, Clone, Default)]
pub struct DetectionOutcome {
    /// Duplicates in classification order
    pub records: Vec<DuplicateRecord>,
    /// Final counters
    pub stats: DetectionStats,
}

impl<'a> DuplicateDetector<'a> {
    /// Create a detector writing duplicate paths to `list`.
    #[must_use]
    pub fn new(list: DuplicateList, sink: &'a dyn ResultSink) -> Self {
        Self {
            table: HashMap::new(),
            list,
            sink,
            records: Vec::new(),
            stats: DetectionStats::default(),
        }
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> &DetectionStats {
        &self.stats
    }

    /// Classify one hash result.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::Write`] if the duplicate list cannot be appended to.
    pub fn process(&mut self, result: HashResult) -> Result<Classification, ListError> {
        let HashResult { path, outcome } = result;

        let digest = match outcome {
            Ok(digest) if !digest.is_empty() => digest,
            Ok(_) => {
                self.stats.hash_errors += 1;
                self.sink
                    .on_progress(&format!("ERR: {} -> hash failed", path.display()));
                return Ok(Classification::Failed);
            }
            Err(HashError::Cancelled(_)) => {
                self.stats.cancelled += 1;
                return Ok(Classification::Cancelled);
            }
            Err(e) => {
                self.stats.hash_errors += 1;
                self.sink
                    .on_progress(&format!("ERR: {} -> hash failed ({})", path.display(), e));
                return Ok(Classification::Failed);
            }
        };

        self.stats.hashed += 1;

        let (digest, original) = match self.table.entry(digest) {
            Entry::Vacant(slot) => {
                log::trace!("Original {} for {}", path.display(), slot.key());
                slot.insert(path);
                self.stats.originals += 1;
                return Ok(Classification::Original);
            }
            Entry::Occupied(slot) => (slot.key().clone(), slot.get().clone()),
        };

        // Size is taken now, not at discovery; the file may have changed.
        let size = match fs::metadata(&path) {
            Ok(meta) => Some(meta.len()),
            Err(e) => {
                log::warn!(
                    "Duplicate {} could not be re-read for size: {}",
                    path.display(),
                    e
                );
                None
            }
        };

        self.list.append(&path)?;

        self.stats.duplicates += 1;
        match size {
            Some(bytes) => self.stats.bytes_saved += bytes,
            None => self.stats.unsized_duplicates += 1,
        }

        log::debug!("Duplicate {} of {}", path.display(), original.display());

        let record = DuplicateRecord::new(path, size, digest, original);
        self.sink.on_duplicate(&record);
        self.records.push(record.clone());
        Ok(Classification::Duplicate(record))
    }

    /// Drain a whole result stream.
    ///
    /// # Errors
    ///
    /// Stops at the first persistence error.
    pub fn consume<I>(mut self, results: I) -> Result<DetectionOutcome, ListError>
    where
        I: IntoIterator<Item = HashResult>,
    {
        for result in results {
            let path = result.path.clone();
            self.process(result)?;
            self.sink.on_hashed(&path);
        }
        self.finish()
    }

    /// Flush the list and return the collected records and counters.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::Write`] if the final flush fails.
    pub fn finish(self) -> Result<DetectionOutcome, ListError> {
        let written = self.list.finish()?;
        log::debug!("Duplicate list closed with {} entries", written);
        Ok(DetectionOutcome {
            records: self.records,
            stats: self.stats,
        })
    }
}
