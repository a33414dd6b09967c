//! Layered application configuration.
//!
//! Sources, lowest to highest precedence:
//!
//! 1. Built-in defaults
//! 2. TOML file: `--config <FILE>`, or `config.toml` in the platform config
//!    directory (`~/.config/dupesweep` on Linux)
//! 3. `DUPESWEEP_*` environment variables (`DUPESWEEP_ALGORITHM=blake3`)
//! 4. CLI flags
//!
//! ```toml
//! algorithm = "blake3"
//! max_concurrency = 64
//! list_path = "/tmp/dupes.txt"
//! skip_hidden = true
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actions::delete::{DeleteConfig, DeleteMode};
use crate::cli::{DeleteArgs, ScanArgs};
use crate::duplicates::{FinderConfig, DEFAULT_MAX_CONCURRENCY};
use crate::output::{DEFAULT_LIST_PATH, DEFAULT_REPORT_PATH};
use crate::scanner::{HashAlgorithm, WalkerConfig};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "DUPESWEEP_";

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    /// A source could not be parsed or had the wrong shape.
    #[error("invalid configuration: {0}")]
    Load(#[source] Box<figment::Error>),

    /// The configured algorithm is not supported.
    #[error("unsupported algorithm '{0}' (expected one of md5, sha1, sha256, sha512, blake3)")]
    UnsupportedAlgorithm(String),

    /// `max_concurrency` was zero.
    #[error("max_concurrency must be at least 1")]
    ZeroConcurrency,

    /// `min_size` is larger than `max_size`.
    #[error("min_size ({min}) is larger than max_size ({max})")]
    InvertedSizeRange { min: u64, max: u64 },
}

/// Effective settings for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hash algorithm identifier
    pub algorithm: String,
    /// Maximum simultaneous hash computations
    pub max_concurrency: usize,
    /// Duplicate list location
    pub list_path: PathBuf,
    /// JSON report location (written only on request)
    pub report_path: PathBuf,
    /// Hash small files first
    pub sort_by_size: bool,
    /// Follow symbolic links while walking
    pub follow_symlinks: bool,
    /// Skip dot-files and dot-directories
    pub skip_hidden: bool,
    /// Minimum candidate size in bytes
    pub min_size: Option<u64>,
    /// Maximum candidate size in bytes
    pub max_size: Option<u64>,
    /// Move deleted files to the trash
    pub trash: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default().name().to_string(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            list_path: PathBuf::from(DEFAULT_LIST_PATH),
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
            sort_by_size: true,
            follow_symlinks: false,
            skip_hidden: false,
            min_size: None,
            max_size: None,
            trash: false,
        }
    }
}

impl Config {
    /// Load defaults, the config file and the environment.
    ///
    /// With `explicit` set the file must exist; otherwise the platform
    /// default location is used if present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] for a missing explicit file and
    /// [`ConfigError::Load`] for unparsable sources.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) if !path.is_file() => Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => Self::load_from_path(path),
            None => match default_config_path() {
                Some(path) => Self::load_from_path(&path),
                None => Self::figment(None).extract().map_err(load_error),
            },
        }
    }

    /// Load defaults, the TOML file at `path` (if it exists) and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] if a source cannot be parsed.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        log::debug!("Loading configuration from {}", path.display());
        Self::figment(Some(path)).extract().map_err(load_error)
    }

    fn figment(path: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]))
    }

    /// Apply scan flags on top of the loaded values.
    pub fn merge_scan_args(&mut self, args: &ScanArgs) {
        if let Some(ref algorithm) = args.algorithm {
            self.algorithm.clone_from(algorithm);
        }
        if let Some(threads) = args.threads {
            self.max_concurrency = threads;
        }
        if let Some(ref list) = args.list {
            self.list_path.clone_from(list);
        }
        if let Some(ref report) = args.report {
            self.report_path.clone_from(report);
        }
        if args.follow_symlinks {
            self.follow_symlinks = true;
        }
        if args.skip_hidden {
            self.skip_hidden = true;
        }
        if args.min_size.is_some() {
            self.min_size = args.min_size;
        }
        if args.max_size.is_some() {
            self.max_size = args.max_size;
        }
        if args.trash {
            self.trash = true;
        }
    }

    /// Apply delete flags on top of the loaded values.
    pub fn merge_delete_args(&mut self, args: &DeleteArgs) {
        if let Some(ref list) = args.list {
            self.list_path.clone_from(list);
        }
        if args.trash {
            self.trash = true;
        }
    }

    /// Check the settings and return the parsed algorithm.
    ///
    /// # Errors
    ///
    /// Rejects an unknown algorithm, a zero concurrency cap and an inverted
    /// size range.
    pub fn validate(&self) -> Result<HashAlgorithm, ConfigError> {
        let algorithm = self
            .algorithm
            .parse()
            .map_err(|_| ConfigError::UnsupportedAlgorithm(self.algorithm.clone()))?;
        if self.max_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        if let (Some(min), Some(max)) = (self.min_size, self.max_size) {
            if min > max {
                return Err(ConfigError::InvertedSizeRange { min, max });
            }
        }
        Ok(algorithm)
    }

    /// Build the finder configuration for a scan.
    #[must_use]
    pub fn finder_config(&self, write_report: bool, shutdown: Arc<AtomicBool>) -> FinderConfig {
        FinderConfig::default()
            .with_algorithm(self.algorithm.clone())
            .with_max_concurrency(self.max_concurrency)
            .with_walker_config(WalkerConfig::new(
                self.follow_symlinks,
                self.skip_hidden,
                self.min_size,
                self.max_size,
            ))
            .with_list_path(self.list_path.clone())
            .with_report_path(write_report.then(|| self.report_path.clone()))
            .with_size_ordering(self.sort_by_size)
            .with_shutdown_flag(shutdown)
    }

    /// Build the deletion configuration.
    #[must_use]
    pub fn delete_config(&self) -> DeleteConfig {
        DeleteConfig {
            mode: if self.trash {
                DeleteMode::Trash
            } else {
                DeleteMode::Permanent
            },
        }
    }
}

fn load_error(e: figment::Error) -> ConfigError {
    ConfigError::Load(Box::new(e))
}

/// Platform default config file location.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "dupesweep").map(|dirs| dirs.config_dir().join("config.toml"))
}
