//! Command-line interface definitions.
//!
//! ```bash
//! # Scan with the default algorithm (sha256)
//! dupesweep scan -d ~/Downloads
//!
//! # Scan with blake3, write duplicates.json, then delete the duplicates
//! dupesweep scan -d ~/Downloads -a blake3 -j -r
//!
//! # Delete later from the persisted list, moving files to the trash
//! dupesweep delete --list duplicate_files.txt --trash
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Concurrent duplicate file finder.
///
/// Hashes every non-empty file under a directory, records every copy after
/// the first in a list, and can remove the listed files.
#[derive(Debug, Parser)]
#[command(name = "dupesweep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase diagnostic verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress lines and diagnostics except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "FILE", global = true, env = "DUPESWEEP_CONFIG")]
    pub config: Option<PathBuf>,

    /// Print fatal errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Scan a directory for duplicate files
    Scan(ScanArgs),
    /// Remove the files named in a duplicate list
    Delete(DeleteArgs),
}

/// Arguments for the scan subcommand.
#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Directory to scan
    #[arg(short = 'd', long, value_name = "DIR")]
    pub directory: PathBuf,

    /// Hash algorithm: md5, sha1, sha256, sha512 or blake3
    #[arg(short, long, value_name = "ALG")]
    pub algorithm: Option<String>,

    /// Delete the listed duplicates after the scan
    #[arg(short = 'r', long)]
    pub delete: bool,

    /// Write the structured JSON report
    #[arg(short, long)]
    pub json: bool,

    /// Maximum number of files hashed at once
    #[arg(long, value_name = "N")]
    pub threads: Option<usize>,

    /// Where to write the duplicate list
    #[arg(long, value_name = "PATH")]
    pub list: Option<PathBuf>,

    /// Where to write the JSON report (implies --json)
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Follow symbolic links
    ///
    /// There is no cycle detection beyond what the directory walker does.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Minimum file size to consider (e.g., 1KB, 1MB, 1GiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Maximum file size to consider (e.g., 1KB, 1MB, 1GiB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// With --delete, move files to the trash instead of removing them
    #[arg(long, requires = "delete")]
    pub trash: bool,
}

/// Arguments for the delete subcommand.
#[derive(Debug, Args)]
pub struct DeleteArgs {
    /// Duplicate list to read
    #[arg(long, value_name = "PATH")]
    pub list: Option<PathBuf>,

    /// Move files to the trash instead of removing them
    #[arg(long)]
    pub trash: bool,
}

/// Parse a human-readable size such as `512`, `10KB`, `1.5MiB`.
///
/// Decimal suffixes (K, KB, M, MB, ...) are powers of 1000; binary ones
/// (KiB, MiB, ...) are powers of 1024. Case-insensitive.
///
/// ```
/// use dupesweep::cli::parse_size;
///
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// assert_eq!(parse_size("2MB").unwrap(), 2_000_000);
/// ```
///
/// # Errors
///
/// Returns a message for empty input, a malformed or negative number, or an
/// unknown suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    const UNITS: &[(&str, u64)] = &[
        ("", 1),
        ("B", 1),
        ("K", 1_000),
        ("KB", 1_000),
        ("KIB", 1 << 10),
        ("M", 1_000_000),
        ("MB", 1_000_000),
        ("MIB", 1 << 20),
        ("G", 1_000_000_000),
        ("GB", 1_000_000_000),
        ("GIB", 1 << 30),
        ("T", 1_000_000_000_000),
        ("TB", 1_000_000_000_000),
        ("TIB", 1 << 40),
    ];

    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }
    if s.starts_with('-') {
        return Err("Size cannot be negative".to_string());
    }

    let split = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());
    let (number, suffix) = s.split_at(split);
    let suffix = suffix.trim().to_ascii_uppercase();

    let value: f64 = number
        .parse()
        .map_err(|_| format!("Invalid number: '{number}'"))?;
    let multiplier = UNITS
        .iter()
        .find(|(unit, _)| *unit == suffix)
        .map(|(_, m)| *m)
        .ok_or_else(|| format!("Unknown size suffix: '{suffix}'"))?;

    Ok((value * multiplier as f64) as u64)
}
