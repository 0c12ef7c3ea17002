//! Compile-time defaults for the aggregator
//!
//! Broker host/port/topic defaults live with the transport configuration in
//! `roomsense-connectors`; everything here concerns the in-process state and
//! the durable log.

/// Number of readings retained in the in-memory history ring.
///
/// Oldest entries are evicted first once the ring is full. The durable log
/// is unbounded and keeps everything.
pub const HISTORY_CAPACITY: usize = 20;

/// Default lower temperature threshold in °C.
pub const DEFAULT_TEMP_MIN: f32 = 18.0;

/// Default upper temperature threshold in °C.
pub const DEFAULT_TEMP_MAX: f32 = 26.0;

/// Default lower relative-humidity threshold in %.
pub const DEFAULT_HUMIDITY_MIN: f32 = 30.0;

/// Default upper relative-humidity threshold in %.
pub const DEFAULT_HUMIDITY_MAX: f32 = 70.0;

/// Default path of the append-only CSV log.
pub const DEFAULT_LOG_PATH: &str = "sensor_data.csv";

/// Wall-clock timestamp format used for readings and log rows.
///
/// Second granularity, locale-independent.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
