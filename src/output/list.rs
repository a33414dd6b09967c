//! Persisted duplicate list (`duplicate_files.txt`).
//!
//! One path per line, no header. The file is truncated when a scan starts
//! and appended to sequentially by the duplicate detector. It is the only
//! input of the deletion phase, which may run much later against a list
//! whose entries no longer exist.

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Default file name of the persisted list, relative to the working directory.
pub const DEFAULT_LIST_PATH: &str = "duplicate_files.txt";

/// Errors creating, writing or reading the persisted list.
#[derive(Debug, Error)]
pub enum ListError {
    /// The list could not be created or truncated.
    #[error("cannot create duplicate list {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Appending to the list failed mid-scan.
    #[error("cannot write duplicate list {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The list could not be opened or read.
    #[error("cannot read duplicate list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Append-only writer for the persisted duplicate list.
#[derive(Debug)]
pub struct DuplicateList {
    path: PathBuf,
    writer: BufWriter<File>,
    written: usize,
}

impl DuplicateList {
    /// Create (or truncate) the list at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::Create`] if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self, ListError> {
        let file = File::create(path).map_err(|source| ListError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("Duplicate list opened at {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    /// Number of paths appended so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.written
    }

    /// Whether nothing has been appended yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.written == 0
    }

    /// Append one path as a new line.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::Write`] on I/O failure.
    pub fn append(&mut self, entry: &Path) -> Result<(), ListError> {
        self.writer
            .write_all(&path_to_bytes(entry))
            .and_then(|()| self.writer.write_all(b"\n"))
            .map_err(|source| ListError::Write {
                path: self.path.clone(),
                source,
            })?;
        self.written += 1;
        Ok(())
    }

    /// Flush buffered lines to disk and close the list.
    ///
    /// # Errors
    ///
    /// Returns [`ListError::Write`] if the final flush fails.
    pub fn finish(mut self) -> Result<usize, ListError> {
        self.writer.flush().map_err(|source| ListError::Write {
            path: self.path.clone(),
            source,
        })?;
        Ok(self.written)
    }
}

/// Read a persisted list: each line trimmed, blank lines skipped.
///
/// # Errors
///
/// Returns [`ListError::Read`] if the list cannot be opened or read.
pub fn read_list(path: &Path) -> Result<Vec<PathBuf>, ListError> {
    let read_err = |source| ListError::Read {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(read_err)?;
    let mut entries = Vec::new();

    for line in BufReader::new(file).split(b'\n') {
        let line = line.map_err(read_err)?;
        let trimmed = line.trim_ascii();
        if trimmed.is_empty() {
            continue;
        }
        entries.push(bytes_to_path(trimmed));
    }

    Ok(entries)
}

#[cfg(unix)]
fn path_to_bytes(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.as_os_str().as_bytes().to_vec()
}

#[cfg(not(unix))]
fn path_to_bytes(path: &Path) -> Vec<u8> {
    path.to_string_lossy().into_owned().into_bytes()
}

#[cfg(unix)]
fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStringExt;
    PathBuf::from(OsString::from_vec(bytes.to_vec()))
}

#[cfg(not(unix))]
fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    PathBuf::from(OsString::from(String::from_utf8_lossy(bytes).into_owned()))
}
