//! Gateway configuration.
//!
//! [`GatewayConfig`] is a plain value filled in by the caller before
//! [`Gateway::start`](crate::gateway::Gateway::start); the data plane reads
//! no environment variables and no files. All fields default to the OKX
//! public endpoint and the tuning values the gateway was profiled with.

use std::time::Duration;

use crate::{FeedError, Result};

/// OKX public market-data host.
pub const DEFAULT_HOST: &str = "ws.okx.com";

/// TLS WebSocket port.
pub const DEFAULT_PORT: u16 = 443;

/// Public (unauthenticated) WebSocket path.
pub const DEFAULT_PATH: &str = "/ws/v5/public";

/// Ring slots between the session thread and the book worker.
const DEFAULT_RING_CAPACITY: usize = 4096;

/// Wait between reconnection attempts after a connect or read failure.
const DEFAULT_RECONNECT_BACKOFF: Duration = Duration::from_secs(2);

/// Worker back-off when the ring is empty.
const DEFAULT_WORKER_IDLE_SLEEP: Duration = Duration::from_nanos(100);

/// Configuration for a [`Gateway`](crate::gateway::Gateway).
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Instrument ids to subscribe to on the `books` channel. An empty set
    /// makes the gateway a no-op.
    pub instruments: Vec<String>,
    /// Exchange host name; also used as the SNI name for TLS.
    pub host: String,
    pub port: u16,
    /// WebSocket path of the public book channel.
    pub path: String,
    /// Capacity of the session→worker ring. Must be a power of two; one
    /// slot is kept free, so at most `ring_capacity - 1` updates queue.
    pub ring_capacity: usize,
    pub reconnect_backoff: Duration,
    pub worker_idle_sleep: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            instruments: Vec::new(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            path: DEFAULT_PATH.to_string(),
            ring_capacity: DEFAULT_RING_CAPACITY,
            reconnect_backoff: DEFAULT_RECONNECT_BACKOFF,
            worker_idle_sleep: DEFAULT_WORKER_IDLE_SLEEP,
        }
    }
}

impl GatewayConfig {
    /// Default configuration subscribed to the given instruments.
    #[must_use]
    pub fn new(instruments: Vec<String>) -> Self {
        Self {
            instruments,
            ..Self::default()
        }
    }

    /// Checks the configuration before the gateway starts.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Config`] if the ring capacity is not a power of
    /// two (or is smaller than two slots), if the host is empty, or if any
    /// instrument id is empty.
    pub fn validate(&self) -> Result<()> {
        if !self.ring_capacity.is_power_of_two() || self.ring_capacity < 2 {
            return Err(FeedError::Config(format!(
                "ring capacity must be a power of two >= 2, got {}",
                self.ring_capacity
            )));
        }

        if self.host.is_empty() {
            return Err(FeedError::Config("host must not be empty".to_string()));
        }

        if self.instruments.iter().any(String::is_empty) {
            return Err(FeedError::Config(
                "instrument ids must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
