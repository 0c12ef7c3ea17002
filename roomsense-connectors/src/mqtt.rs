//! MQTT subscriber with an unlimited-retry reconnect state machine
//!
//! One long-lived task owns the connection lifecycle:
//!
//! ```text
//! Disconnected ──> Connecting ──(CONNACK)──> Connected
//!       ▲                                        │
//!       └───────(fixed delay)──(any error)───────┘
//! ```
//!
//! There is no terminal state; the client retries for the life of the
//! process unless the cancellation token fires. On CONNACK it subscribes to
//! the single configured topic and dispatches every inbound publish through
//! the parser into the aggregate. Malformed payloads are logged and
//! dropped; they never terminate the receive loop.
//!
//! Keep-alive and the reconnect delay are distinct knobs: keep-alive is the
//! MQTT ping interval that lets a stalled broker be detected, the reconnect
//! delay is how long the machine sits in `Disconnected` before trying
//! again.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use log::{error, info, warn};
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use roomsense_core::{parse_payload, SensorState};

use crate::TransportError;

/// Default broker host.
pub const DEFAULT_BROKER_HOST: &str = "localhost";

/// Default broker port.
pub const DEFAULT_BROKER_PORT: u16 = 1883;

/// Single topic the sensor process publishes on.
pub const DEFAULT_TOPIC: &str = "sensor/temperature";

/// MQTT keep-alive (ping) interval in seconds.
pub const DEFAULT_KEEP_ALIVE_SECS: u64 = 60;

/// Fixed delay between reconnect attempts in seconds.
pub const DEFAULT_RECONNECT_DELAY_SECS: u64 = 5;

// Event-loop request channel capacity; we only ever queue one subscribe
const EVENT_LOOP_CAPACITY: usize = 10;

/// Broker and subscription settings.
#[derive(Debug, Clone)]
pub struct MqttConfig {
    /// Broker hostname or address.
    pub host: String,
    /// Broker port.
    pub port: u16,
    /// Topic to subscribe to.
    pub topic: String,
    /// Client identifier presented to the broker.
    pub client_id: String,
    /// MQTT keep-alive interval.
    pub keep_alive: Duration,
    /// Delay between reconnect attempts.
    pub reconnect_delay: Duration,
}

impl MqttConfig {
    /// Configuration for a broker at `host:port` with default topic and
    /// timing.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            topic: DEFAULT_TOPIC.into(),
            client_id: "roomsense-aggregator".into(),
            keep_alive: Duration::from_secs(DEFAULT_KEEP_ALIVE_SECS),
            reconnect_delay: Duration::from_secs(DEFAULT_RECONNECT_DELAY_SECS),
        }
    }

    /// Set the topic to subscribe to.
    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Set the client identifier.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Set the keep-alive interval in seconds.
    pub fn keep_alive_secs(mut self, secs: u64) -> Self {
        self.keep_alive = Duration::from_secs(secs);
        self
    }

    /// Set the reconnect delay in seconds.
    pub fn reconnect_delay_secs(mut self, secs: u64) -> Self {
        self.reconnect_delay = Duration::from_secs(secs);
        self
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BROKER_HOST, DEFAULT_BROKER_PORT)
    }
}

/// Where the reconnect state machine currently is.
///
/// Published on a watch channel for observers; advisory only, the machine
/// itself drives all transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected; waiting out the reconnect delay or not yet started.
    Disconnected,
    /// Connect attempt in flight.
    Connecting,
    /// Subscribed and receiving.
    Connected,
}

/// Ingest counters, readable while the client runs.
#[derive(Debug, Default, Clone)]
pub struct IngestStats {
    /// Publishes received on the subscribed topic.
    pub messages_received: u64,
    /// Payloads that parsed and reached the aggregate.
    pub readings_accepted: u64,
    /// Payloads dropped as malformed.
    pub parse_failures: u64,
    /// Completed Disconnected -> Connecting transitions after a failure.
    pub reconnections: u32,
}

/// MQTT ingest client: subscribes to one topic and feeds the aggregate.
pub struct MqttIngest {
    config: MqttConfig,
    state: Arc<SensorState>,
    stats: Arc<Mutex<IngestStats>>,
    conn_tx: watch::Sender<ConnectionState>,
}

impl MqttIngest {
    /// Build an ingest client for `config` feeding `state`.
    pub fn new(config: MqttConfig, state: Arc<SensorState>) -> Self {
        let (conn_tx, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            config,
            state,
            stats: Arc::new(Mutex::new(IngestStats::default())),
            conn_tx,
        }
    }

    /// Receiver for connection-state transitions.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.conn_tx.subscribe()
    }

    /// Current counters.
    pub fn stats(&self) -> IngestStats {
        self.stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run the connect/receive loop until `shutdown` fires.
    ///
    /// Every transport failure is logged, followed by the fixed reconnect
    /// delay and a fresh connect attempt. The loop never gives up on its
    /// own.
    pub async fn run(&self, shutdown: CancellationToken) {
        let mut first_attempt = true;

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            if !first_attempt {
                self.with_stats(|s| s.reconnections += 1);
            }
            first_attempt = false;

            self.set_state(ConnectionState::Connecting);
            match self.run_session(&shutdown).await {
                // Session only returns Ok on shutdown
                Ok(()) => break,
                Err(e) => {
                    self.set_state(ConnectionState::Disconnected);
                    error!("mqtt transport failure: {e}");
                    info!(
                        "retrying connection in {} seconds",
                        self.config.reconnect_delay.as_secs()
                    );

                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(self.config.reconnect_delay) => {}
                    }
                }
            }
        }

        self.set_state(ConnectionState::Disconnected);
    }

    /// One connection's lifetime: connect, subscribe on CONNACK, receive
    /// until a transport error or shutdown.
    async fn run_session(&self, shutdown: &CancellationToken) -> Result<(), TransportError> {
        let mut options = MqttOptions::new(
            self.config.client_id.clone(),
            self.config.host.clone(),
            self.config.port,
        );
        options.set_keep_alive(self.config.keep_alive);

        let (client, mut event_loop) = AsyncClient::new(options, EVENT_LOOP_CAPACITY);

        loop {
            let event = tokio::select! {
                _ = shutdown.cancelled() => return Ok(()),
                event = event_loop.poll() => event?,
            };

            match event {
                Event::Incoming(Packet::ConnAck(ack)) => {
                    info!(
                        "connected to broker {}:{} (code: {:?})",
                        self.config.host, self.config.port, ack.code
                    );
                    self.set_state(ConnectionState::Connected);
                    client
                        .subscribe(&self.config.topic, QoS::AtMostOnce)
                        .await?;
                    info!("subscribed to {}", self.config.topic);
                }
                Event::Incoming(Packet::Publish(publish)) => {
                    self.dispatch(&publish.payload);
                }
                _ => {}
            }
        }
    }

    /// Hand one raw payload to the parser and, on success, the aggregate.
    ///
    /// Synchronous and non-blocking by contract: all waiting lives in the
    /// transport loop, never here.
    fn dispatch(&self, payload: &[u8]) {
        self.with_stats(|s| s.messages_received += 1);

        let text = match std::str::from_utf8(payload) {
            Ok(text) => text,
            Err(_) => {
                warn!("dropping non-UTF-8 payload ({} bytes)", payload.len());
                self.with_stats(|s| s.parse_failures += 1);
                return;
            }
        };

        match parse_payload(text) {
            Ok((temperature, humidity)) => {
                info!("received reading: {temperature}°C, {humidity}%");
                self.state.update(temperature, humidity);
                self.with_stats(|s| s.readings_accepted += 1);
            }
            Err(e) => {
                warn!("dropping malformed payload {text:?}: {e}");
                self.with_stats(|s| s.parse_failures += 1);
            }
        }
    }

    fn set_state(&self, state: ConnectionState) {
        self.conn_tx.send_replace(state);
    }

    fn with_stats(&self, f: impl FnOnce(&mut IngestStats)) {
        f(&mut self.stats.lock().unwrap_or_else(PoisonError::into_inner));
    }
}
