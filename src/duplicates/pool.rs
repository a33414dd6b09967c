//! Bounded worker pool for parallel file hashing.
//!
//! # Overview
//!
//! [`WorkerPool`] owns a fixed-size rayon thread pool. [`WorkerPool::run`]
//! queues one hashing task per [`FileRecord`] in the order given and returns a
//! [`HashStream`] that yields every [`HashResult`] as soon as it is ready.
//!
//! Fan-out/fan-in: each task holds a clone of the channel sender and sends
//! exactly one result. A feeder thread runs the whole batch inside a rayon
//! FIFO scope, which returns only once every task has finished; the last
//! sender is dropped after that, so the stream ends exactly when the scan is
//! complete and the consumer needs no separate completion signal.
//!
//! Cancellation is per file: once the shutdown flag is set (or the stream is
//! dropped), tasks that have not started yet report
//! [`HashError::Cancelled`] instead of reading the file.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};
use thiserror::Error;

use super::HashResult;
use crate::scanner::{FileRecord, HashError, Hasher};

/// Default cap on simultaneously running hash computations.
pub const DEFAULT_MAX_CONCURRENCY: usize = 128;

/// Errors setting up the worker pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The rayon thread pool could not be created.
    #[error("failed to build hashing thread pool: {0}")]
    Build(#[from] rayon::ThreadPoolBuildError),

    /// The feeder thread could not be spawned.
    #[error("failed to spawn hashing feeder thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Fixed-size pool of hashing workers.
pub struct WorkerPool {
    pool: rayon::ThreadPool,
    workers: usize,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("workers", &self.workers)
            .finish()
    }
}

impl WorkerPool {
    /// Build a pool running at most `max_concurrency` hashes at once.
    ///
    /// A value of zero is treated as one.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Build`] if the OS refuses to create the threads.
    pub fn new(max_concurrency: usize) -> Result<Self, PoolError> {
        let workers = max_concurrency.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("dupesweep-hash-{i}"))
            .build()?;

        log::debug!("Hash pool ready with {} workers", workers);

        Ok(Self { pool, workers })
    }

    /// Number of worker threads.
    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Hash every record and stream the results back.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Spawn`] if the feeder thread cannot start.
    pub fn run(
        self,
        records: Vec<FileRecord>,
        hasher: Hasher,
        shutdown: Option<Arc<AtomicBool>>,
    ) -> Result<HashStream, PoolError> {
        let total = records.len();
        let (tx, rx) = crossbeam_channel::unbounded();
        let abandoned = Arc::new(AtomicBool::new(false));
        let cancel = Cancel {
            shutdown,
            abandoned: Arc::clone(&abandoned),
        };

        let pool = self.pool;
        let feeder = std::thread::Builder::new()
            .name("dupesweep-feeder".to_string())
            .spawn(move || feed(&pool, records, &hasher, &cancel, tx))
            .map_err(PoolError::Spawn)?;

        Ok(HashStream {
            receiver: rx,
            feeder: Some(feeder),
            abandoned,
            total,
        })
    }
}

/// Cancellation sources checked before each file is opened.
struct Cancel {
    shutdown: Option<Arc<AtomicBool>>,
    abandoned: Arc<AtomicBool>,
}

impl Cancel {
    fn requested(&self) -> bool {
        self.abandoned.load(Ordering::SeqCst)
            || self
                .shutdown
                .as_ref()
                .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Run the batch on the pool; returns after the last task has sent its result.
fn feed(
    pool: &rayon::ThreadPool,
    records: Vec<FileRecord>,
    hasher: &Hasher,
    cancel: &Cancel,
    tx: Sender<HashResult>,
) {
    pool.scope_fifo(|scope| {
        for record in records {
            let tx = tx.clone();
            scope.spawn_fifo(move |_| {
                let result = hash_record(hasher, record.path, cancel);
                // The receiver is gone only if the consumer stopped early.
                let _ = tx.send(result);
            });
        }
    });
    log::trace!("Hash pool: all tasks completed");
}

fn hash_record(hasher: &Hasher, path: PathBuf, cancel: &Cancel) -> HashResult {
    if cancel.requested() {
        return HashResult::failed(path.clone(), HashError::Cancelled(path));
    }

    match hasher.digest(&path) {
        Ok(digest) => {
            log::trace!("Hashed {}", path.display());
            HashResult::ok(path, digest)
        }
        Err(e) => {
            log::debug!("Failed to hash {}: {}", path.display(), e);
            HashResult::failed(path, e)
        }
    }
}

/// Ordered stream of hash results, closed once every file has been handled.
#[derive(Debug)]
pub struct HashStream {
    receiver: Receiver<HashResult>,
    feeder: Option<JoinHandle<()>>,
    abandoned: Arc<AtomicBool>,
    total: usize,
}

impl HashStream {
    /// Number of results this stream will yield in total.
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }
}

impl Iterator for HashStream {
    type Item = HashResult;

    fn next(&mut self) -> Option<HashResult> {
        self.receiver.recv().ok()
    }
}

impl Drop for HashStream {
    fn drop(&mut self) {
        // Dropped before exhaustion: let queued tasks finish without hashing.
        self.abandoned.store(true, Ordering::SeqCst);
        if let Some(handle) = self.feeder.take() {
            if handle.join().is_err() {
                log::error!("Hash feeder thread panicked");
            }
        }
    }
}
