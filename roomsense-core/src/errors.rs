//! Error types for payload parsing and log persistence
//!
//! Nothing in this crate is fatal: parse failures drop the message,
//! persistence failures are reported and the in-memory state stays
//! authoritative. Errors are kept small and matchable so callers can decide
//! per-variant what to log.

use thiserror::Error;

/// A sensor payload could not be turned into a reading.
///
/// The message is dropped and no state changes; the transport loop keeps
/// running.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Splitting on the comma did not yield exactly two fields.
    #[error("expected 2 comma-separated fields, found {found}")]
    WrongFieldCount {
        /// Number of fields the payload actually contained.
        found: usize,
    },

    /// A field was present but is not a finite number.
    #[error("field is not a finite number")]
    NonNumericField,
}

/// The durable log could not be written or read.
///
/// Never blocks or rolls back the in-memory update; callers log it and move
/// on, or surface an empty result for bulk reads.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Underlying file operation failed.
    #[error("log I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
