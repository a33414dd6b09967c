//! Structured duplicate report (`duplicates.json`).
//!
//! Written only when requested. The report is a pretty-printed array with
//! one object per duplicate, in classification order.
//!
//! # Output Schema
//!
//! ```json
//! [
//!   {
//!     "FileName": "b.txt",
//!     "FilePath": "/data/b.txt",
//!     "FileSize": 1024,
//!     "Hash": "9f86d081884c7d65..."
//!   }
//! ]
//! ```
//!
//! `FileSize` is `null` when the duplicate could not be re-read at
//! classification time.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::duplicates::DuplicateRecord;

/// Default file name of the structured report.
pub const DEFAULT_REPORT_PATH: &str = "duplicates.json";

/// One duplicate in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JsonDuplicate {
    /// File name component
    pub file_name: String,
    /// Full path as recorded during the scan
    pub file_path: String,
    /// Size in bytes at classification time
    pub file_size: Option<u64>,
    /// Hex digest
    pub hash: String,
}

impl From<&DuplicateRecord> for JsonDuplicate {
    fn from(record: &DuplicateRecord) -> Self {
        Self {
            file_name: record.name.clone(),
            file_path: record.path.to_string_lossy().into_owned(),
            file_size: record.size,
            hash: record.digest.clone(),
        }
    }
}

/// The complete structured report.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct JsonReport {
    /// Duplicates in classification order
    pub duplicates: Vec<JsonDuplicate>,
}

impl JsonReport {
    /// Build a report from detector records.
    #[must_use]
    pub fn new(records: &[DuplicateRecord]) -> Self {
        Self {
            duplicates: records.iter().map(JsonDuplicate::from).collect(),
        }
    }

    /// Serialize to a pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write the pretty-printed report to `path`, replacing any previous file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn write_to(&self, path: &Path) -> anyhow::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}
