//! Core state aggregation for roomsense
//!
//! Receives parsed temperature/humidity readings from a transport layer,
//! keeps the latest reading plus a bounded recent-history ring, persists
//! every reading to an append-only CSV log, and evaluates configurable
//! threshold alerts.
//!
//! The aggregate (`latest` + `history` + `thresholds`) is guarded as one
//! unit, so concurrent readers never observe a half-applied update.
//!
//! ```no_run
//! use roomsense_core::{CsvLog, SensorState, parse_payload};
//!
//! let state = SensorState::new(CsvLog::new("sensor_data.csv"))?;
//!
//! // Transport layer hands us a raw payload
//! let (temperature, humidity) = parse_payload("23.50,45.20")?;
//! state.update(temperature, humidity);
//!
//! let snapshot = state.snapshot();
//! assert_eq!(snapshot.history.len(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod constants;
pub mod csvlog;
pub mod errors;
pub mod history;
pub mod reading;
pub mod state;
pub mod thresholds;

// Public API
pub use csvlog::CsvLog;
pub use errors::{ParseError, PersistenceError};
pub use reading::{parse_payload, Reading};
pub use state::{SensorState, Snapshot};
pub use thresholds::{ThresholdReport, Thresholds, Violation, ViolationKind};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_exists() {
        assert!(!VERSION.is_empty());
    }
}
