//! Result sinks: the progress stream and the duplicate stream.
//!
//! A scan reports to a [`ResultSink`] through two logical channels:
//! human-readable progress lines and duplicate records. Presentation layers
//! pick an implementation:
//!
//! - [`ConsoleSink`] prints both streams to stdout and shows an indicatif
//!   bar for the hashing phase.
//! - [`ChannelSink`] forwards both streams over crossbeam channels for a
//!   separate UI thread to drain.
//!
//! Deletion progress uses [`ConsoleDeleteReporter`].

use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::sync::Mutex;

use crossbeam_channel::{Receiver, Sender};
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::actions::delete::{BatchDeleteResult, DeleteProgressCallback};
use crate::duplicates::DuplicateRecord;

/// Consumer of scan output.
///
/// Called from the scanning thread only, but implementations must be
/// shareable so a UI can hold them from elsewhere.
pub trait ResultSink: Send + Sync {
    /// One progress or log line (no trailing newline).
    fn on_progress(&self, line: &str);

    /// A file was classified as a duplicate.
    fn on_duplicate(&self, record: &DuplicateRecord);

    /// Hashing is about to start for `total` files.
    fn on_hash_start(&self, _total: usize) {}

    /// One hash result has been consumed.
    fn on_hashed(&self, _path: &Path) {}

    /// Hashing finished.
    fn on_hash_end(&self) {}
}

/// Prints progress and duplicate paths to stdout.
pub struct ConsoleSink {
    quiet: bool,
    bar: Mutex<Option<ProgressBar>>,
}

impl ConsoleSink {
    /// Create a console sink.
    ///
    /// With `quiet` set, progress lines and the bar are suppressed but
    /// duplicate paths are still printed.
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            quiet,
            bar: Mutex::new(None),
        }
    }

    fn hash_style() -> ProgressStyle {
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg} (ETA: {eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█>-")
    }

    /// Print a line, routing it around an active progress bar.
    fn print_line(&self, line: &str) {
        let guard = self.bar.lock().unwrap_or_else(|e| e.into_inner());
        match guard.as_ref() {
            Some(pb) => pb.println(line),
            None => {
                let _ = writeln!(io::stdout().lock(), "{line}");
            }
        }
    }
}

impl ResultSink for ConsoleSink {
    fn on_progress(&self, line: &str) {
        if !self.quiet {
            self.print_line(line);
        }
    }

    fn on_duplicate(&self, record: &DuplicateRecord) {
        self.print_line(&record.path.display().to_string());
    }

    fn on_hash_start(&self, total: usize) {
        if self.quiet || !io::stderr().is_terminal() {
            return;
        }
        let pb = ProgressBar::with_draw_target(Some(total as u64), ProgressDrawTarget::stderr());
        pb.set_style(Self::hash_style());
        pb.set_message("Hashing");
        *self.bar.lock().unwrap_or_else(|e| e.into_inner()) = Some(pb);
    }

    fn on_hashed(&self, path: &Path) {
        if let Some(pb) = self.bar.lock().unwrap_or_else(|e| e.into_inner()).as_ref() {
            pb.inc(1);
            pb.set_message(truncate_path(&path.to_string_lossy(), 30));
        }
    }

    fn on_hash_end(&self) {
        if let Some(pb) = self.bar.lock().unwrap_or_else(|e| e.into_inner()).take() {
            pb.finish_and_clear();
        }
    }
}

/// Forwards both streams over channels.
///
/// Sends never block; if a receiver has been dropped the item is discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    progress: Sender<String>,
    duplicates: Sender<DuplicateRecord>,
}

impl ChannelSink {
    /// Create a sink plus the receivers for progress lines and duplicates.
    #[must_use]
    pub fn new() -> (Self, Receiver<String>, Receiver<DuplicateRecord>) {
        let (progress, progress_rx) = crossbeam_channel::unbounded();
        let (duplicates, duplicates_rx) = crossbeam_channel::unbounded();
        (
            Self {
                progress,
                duplicates,
            },
            progress_rx,
            duplicates_rx,
        )
    }
}

impl ResultSink for ChannelSink {
    fn on_progress(&self, line: &str) {
        let _ = self.progress.send(line.to_string());
    }

    fn on_duplicate(&self, record: &DuplicateRecord) {
        let _ = self.duplicates.send(record.clone());
    }
}

/// Prints per-file deletion outcomes and the final tally to stdout.
#[derive(Debug, Default)]
pub struct ConsoleDeleteReporter;

impl DeleteProgressCallback for ConsoleDeleteReporter {
    fn on_before_delete(&self, _path: &Path, _index: usize, _total: usize) {}

    fn on_delete_success(&self, path: &Path, _size: u64) {
        println!("Deleted: {}", path.display());
    }

    fn on_delete_failure(&self, path: &Path, error: &str) {
        println!("Skip: {} ({})", path.display(), error);
    }

    fn on_complete(&self, result: &BatchDeleteResult) {
        println!("{}", result.summary());
    }
}

/// Truncate a path for display in the progress bar.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len >= max_len {
        let tail: String = file_name.chars().skip(name_len + 3 - max_len).collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
