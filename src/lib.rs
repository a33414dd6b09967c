//! dupesweep - concurrent duplicate file finder
//!
//! Walks a directory tree, hashes every non-empty file on a bounded worker
//! pool, and classifies each file as the first copy of its content or a
//! duplicate. Duplicate paths are written to a plain-text list that a
//! separate deletion phase consumes.
//!
//! ```no_run
//! use dupesweep::duplicates::{DuplicateFinder, FinderConfig};
//! use dupesweep::progress::ConsoleSink;
//! use std::path::Path;
//!
//! let report = DuplicateFinder::new(FinderConfig::default())
//!     .scan(Path::new("/data"), &ConsoleSink::new(false))
//!     .unwrap();
//! assert_eq!(report.records.len(), report.duplicate_count());
//! ```

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;

use anyhow::{Context, Result};

use crate::actions::delete::delete_from_list;
use crate::cli::{Cli, Commands, ScanArgs};
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, ScanReport};
use crate::error::ExitCode;
use crate::progress::{ConsoleDeleteReporter, ConsoleSink, ResultSink};

/// Run the CLI and return the exit code to report.
///
/// # Errors
///
/// Returns an error for configuration problems, an unsupported algorithm,
/// an uncreatable duplicate list, or an unreadable list in the delete phase.
/// A missing scan root is not an error; it yields [`ExitCode::NoDuplicates`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let mut config =
        Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Scan(ref args) => {
            config.merge_scan_args(args);
            handle_scan(&config, args, cli.quiet)
        }
        Commands::Delete(ref args) => {
            config.merge_delete_args(args);
            handle_delete(&config)
        }
    }
}

fn handle_scan(config: &Config, args: &ScanArgs, quiet: bool) -> Result<ExitCode> {
    config.validate()?;

    let shutdown = signal::install_handler();
    let write_report = args.json || args.report.is_some();
    let finder = DuplicateFinder::new(config.finder_config(write_report, shutdown.get_flag()));
    let sink = ConsoleSink::new(quiet);

    let report = match finder.scan(&args.directory, &sink) {
        Ok(report) => report,
        Err(e) if e.is_missing_root() => {
            log::debug!("{}", e);
            return Ok(ExitCode::NoDuplicates);
        }
        Err(e) => return Err(e).context("Scan failed"),
    };

    if report.interrupted || shutdown.is_shutdown_requested() {
        log::warn!("Scan interrupted; the duplicate list may be incomplete");
        return Ok(ExitCode::Interrupted);
    }

    if args.delete {
        sink.on_progress(&format!(
            "Deletion flag set: removing duplicates listed in {}...",
            report.list_path.display()
        ));
        delete_from_list(
            &report.list_path,
            &config.delete_config(),
            Some(&ConsoleDeleteReporter),
        )
        .context("Deletion phase failed")?;
    }

    Ok(scan_exit_code(&report))
}

fn handle_delete(config: &Config) -> Result<ExitCode> {
    delete_from_list(
        &config.list_path,
        &config.delete_config(),
        Some(&ConsoleDeleteReporter),
    )
    .with_context(|| format!("Could not open {}", config.list_path.display()))?;
    Ok(ExitCode::Success)
}

/// Map a finished scan to its exit code.
#[must_use]
pub fn scan_exit_code(report: &ScanReport) -> ExitCode {
    if report.interrupted {
        ExitCode::Interrupted
    } else if report.has_errors() {
        ExitCode::PartialSuccess
    } else if report.duplicate_count() > 0 {
        ExitCode::Success
    } else {
        ExitCode::NoDuplicates
    }
}
