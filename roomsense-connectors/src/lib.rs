//! Transport connectors for roomsense
//!
//! Currently one transport: an MQTT subscriber that feeds inbound
//! `"<temperature>,<humidity>"` payloads into the
//! [`roomsense_core::SensorState`] aggregate and reconnects forever on any
//! transport failure.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use roomsense_connectors::{MqttConfig, MqttIngest};
//! use roomsense_core::{CsvLog, SensorState};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let state = Arc::new(SensorState::new(CsvLog::new("sensor_data.csv"))?);
//! let ingest = MqttIngest::new(MqttConfig::default(), Arc::clone(&state));
//!
//! let shutdown = CancellationToken::new();
//! ingest.run(shutdown).await;
//! # Ok(())
//! # }
//! ```

pub mod mqtt;

pub use mqtt::{ConnectionState, IngestStats, MqttConfig, MqttIngest};

use thiserror::Error;

/// Transport-level failures.
///
/// Never fatal: every variant feeds the reconnect state machine, which
/// waits out the configured delay and tries again.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connect attempt failed or the receive loop lost the connection.
    #[error("connection error: {0}")]
    Connection(#[from] rumqttc::ConnectionError),

    /// The subscribe request could not be issued after connecting.
    #[error("subscribe failed: {0}")]
    Subscribe(#[from] rumqttc::ClientError),
}
