//! The process-wide sensor state aggregate
//!
//! [`SensorState`] owns the latest reading, the bounded history ring, and
//! the active thresholds as one mutex-guarded unit. Holding one lock over
//! all three fields is what keeps snapshots consistent: a reader can never
//! observe a `latest` from reading N next to a history tail from reading
//! N-1.
//!
//! The durable-log append happens after the state lock is released. The
//! in-memory view is authoritative and becomes visible first; persistence
//! is best-effort and its failures are logged, never propagated into the
//! update path.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::{error, info};
use serde::Serialize;

use crate::constants::HISTORY_CAPACITY;
use crate::csvlog::CsvLog;
use crate::errors::PersistenceError;
use crate::history::HistoryBuffer;
use crate::reading::Reading;
use crate::thresholds::{ThresholdReport, Thresholds};

/// Consistent owned copy of the aggregate, safe to hold across later
/// updates.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    /// Most recent reading, `None` until the first update.
    pub latest: Option<Reading>,
    /// Recent readings, oldest to newest, at most 20.
    pub history: Vec<Reading>,
    /// Thresholds active at snapshot time.
    pub thresholds: Thresholds,
}

struct Inner {
    latest: Option<Reading>,
    history: HistoryBuffer<HISTORY_CAPACITY>,
    thresholds: Thresholds,
}

/// The aggregate root. One instance exists for the process lifetime.
///
/// Every operation is safe to call concurrently from arbitrarily many
/// tasks; in practice the transport loop is the sole writer of readings
/// while the query surface reads.
pub struct SensorState {
    inner: Mutex<Inner>,
    log: CsvLog,
}

impl SensorState {
    /// Create the aggregate with empty latest/history, default thresholds,
    /// and an initialized durable log.
    pub fn new(log: CsvLog) -> Result<Self, PersistenceError> {
        log.ensure_initialized()?;

        Ok(Self {
            inner: Mutex::new(Inner {
                latest: None,
                history: HistoryBuffer::new(),
                thresholds: Thresholds::default(),
            }),
            log,
        })
    }

    /// Accept a validated reading.
    ///
    /// Stamps it with the current wall clock, replaces `latest`, appends to
    /// the history ring (evicting the oldest entry at capacity), then hands
    /// it to the durable log outside the lock. A log failure is logged and
    /// does not roll back the in-memory update.
    pub fn update(&self, temperature: f32, humidity: f32) {
        let reading = Reading::now(temperature, humidity);

        {
            let mut inner = self.lock();
            inner.latest = Some(reading);
            inner.history.push(reading);
        }

        match self.log.append(&reading) {
            Ok(()) => info!(
                "reading stored: {}, {}°C, {}%",
                reading.timestamp_string(),
                reading.temperature,
                reading.humidity
            ),
            Err(e) => error!("failed to append reading to durable log: {e}"),
        }
    }

    /// Consistent copy of latest, history (oldest to newest), and
    /// thresholds, taken under one lock acquisition.
    pub fn snapshot(&self) -> Snapshot {
        let inner = self.lock();
        Snapshot {
            latest: inner.latest,
            history: inner.history.to_vec(),
            thresholds: inner.thresholds,
        }
    }

    /// Replace the active thresholds wholesale.
    ///
    /// No `min < max` validation is performed; an inverted band makes every
    /// reading report a `Min` violation (see DESIGN.md).
    pub fn set_thresholds(&self, thresholds: Thresholds) {
        self.lock().thresholds = thresholds;
    }

    /// Currently active thresholds.
    pub fn thresholds(&self) -> Thresholds {
        self.lock().thresholds
    }

    /// Evaluate the latest reading against the active thresholds, both
    /// taken from one consistent state view.
    ///
    /// Returns an empty report (both fields absent) while no reading has
    /// arrived yet.
    pub fn check_thresholds(&self) -> ThresholdReport {
        let inner = self.lock();
        match inner.latest {
            Some(reading) => inner.thresholds.evaluate(&reading),
            None => ThresholdReport::default(),
        }
    }

    /// The durable log, for bulk export via
    /// [`CsvLog::read_all`].
    pub fn log(&self) -> &CsvLog {
        &self.log
    }

    // No invariant spans a panic point inside the critical section, so a
    // poisoned lock is recovered, not propagated.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn state_in(dir: &TempDir) -> SensorState {
        SensorState::new(CsvLog::new(dir.path().join("sensor_data.csv"))).unwrap()
    }

    #[test]
    fn starts_empty_with_default_thresholds() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);

        let snapshot = state.snapshot();
        assert!(snapshot.latest.is_none());
        assert!(snapshot.history.is_empty());
        assert_eq!(snapshot.thresholds, Thresholds::default());
    }

    #[test]
    fn update_sets_latest_and_history_tail() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);

        state.update(23.5, 45.2);

        let snapshot = state.snapshot();
        let latest = snapshot.latest.unwrap();
        assert_eq!(latest.temperature, 23.5);
        assert_eq!(latest.humidity, 45.2);
        assert_eq!(snapshot.history.last(), Some(&latest));
    }

    #[test]
    fn check_before_any_update_reports_nothing() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);

        let report = state.check_thresholds();
        assert!(report.temperature.is_none());
        assert!(report.humidity.is_none());
    }

    #[test]
    fn thresholds_are_replaced_wholesale() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);

        let custom = Thresholds {
            temp_min: 10.0,
            temp_max: 30.0,
            humidity_min: 20.0,
            humidity_max: 80.0,
        };
        state.set_thresholds(custom);

        assert_eq!(state.thresholds(), custom);
        assert_eq!(state.snapshot().thresholds, custom);
    }

    #[test]
    fn check_uses_latest_reading_and_current_thresholds() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);

        state.update(17.0, 50.0);
        let report = state.check_thresholds();
        assert!(report.temperature.unwrap().exceeded);
        assert!(!report.humidity.unwrap().exceeded);

        // Widening the band clears the violation for the same reading
        state.set_thresholds(Thresholds {
            temp_min: 10.0,
            ..Thresholds::default()
        });
        assert!(!state.check_thresholds().temperature.unwrap().exceeded);
    }
}
