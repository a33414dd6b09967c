//! Persistent scan artifacts.
//!
//! This module provides the two files a scan can leave behind:
//! - [`list`]: the plain-text duplicate list consumed by the deletion phase
//! - [`json`]: the optional structured report
//!
//! # Example
//!
//! ```no_run
//! use dupesweep::output::list::read_list;
//! use std::path::Path;
//!
//! for path in read_list(Path::new("duplicate_files.txt")).unwrap() {
//!     println!("{}", path.display());
//! }
//! ```

pub mod json;
pub mod list;

// Re-export main types
pub use json::{JsonDuplicate, JsonReport, DEFAULT_REPORT_PATH};
pub use list::{read_list, DuplicateList, ListError, DEFAULT_LIST_PATH};
