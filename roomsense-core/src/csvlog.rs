//! Append-only CSV log of every accepted reading
//!
//! One row per reading, in acceptance order, under a
//! `Timestamp,Temperature,Humidity` header. Rows are never rewritten or
//! deleted by this crate.
//!
//! Each append opens the file, writes one row, and closes it again. That
//! bounds resource usage and tolerates external log rotation; a rotated-away
//! file simply gets recreated on the next append. Failures are reported to
//! the caller and never retried here.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::constants::DEFAULT_LOG_PATH;
use crate::errors::PersistenceError;
use crate::reading::Reading;

/// Header row naming the three columns.
pub const CSV_HEADER: &str = "Timestamp,Temperature,Humidity";

/// Handle to the durable log file.
///
/// No file handle is held between calls. Appends are serialized by an
/// internal lock so row order matches the order updates were accepted.
pub struct CsvLog {
    path: PathBuf,
    append_lock: Mutex<()>,
}

impl CsvLog {
    /// Create a handle for the log at `path`. Touches nothing on disk; call
    /// [`CsvLog::ensure_initialized`] once at startup.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the log with its header row iff no file exists yet.
    ///
    /// Idempotent; an existing log is never rewritten, only appended to.
    pub fn ensure_initialized(&self) -> Result<(), PersistenceError> {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path)
        {
            Ok(mut file) => {
                writeln!(file, "{CSV_HEADER}")?;
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Append one reading as one row.
    ///
    /// Opens in append mode, writes, closes. The caller does not retry on
    /// failure; the in-memory state stays authoritative either way.
    pub fn append(&self, reading: &Reading) -> Result<(), PersistenceError> {
        let _guard = self
            .append_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        writeln!(
            file,
            "{},{},{}",
            reading.timestamp_string(),
            reading.temperature,
            reading.humidity
        )?;
        Ok(())
    }

    /// Read the whole log top to bottom, header row included.
    ///
    /// All-or-nothing: a failure yields the error and no partial rows.
    pub fn read_all(&self) -> Result<Vec<String>, PersistenceError> {
        let contents = fs::read_to_string(&self.path)?;
        Ok(contents.lines().map(str::to_owned).collect())
    }
}

impl Default for CsvLog {
    /// Log at [`DEFAULT_LOG_PATH`] in the working directory.
    fn default() -> Self {
        Self::new(DEFAULT_LOG_PATH)
    }
}
