//! Shared application state for the Pitlane server.
//!
//! [`AppState`] owns the live connection registry and the telemetry
//! generator. REST handlers and `WebSocket` loops both borrow from it; the
//! registry is the only mutable part and guards itself.

use std::sync::Arc;

use pitlane_data::tables::drivers;
use pitlane_data::{PitlaneConfig, StreamSettings, TelemetryGenerator};

use crate::registry::ConnectionRegistry;
use crate::stream::StreamSpec;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`] and injected via Axum's `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Every live connection currently streaming.
    pub registry: Arc<ConnectionRegistry>,
    /// Source of generated telemetry for REST and live frames.
    pub generator: Arc<TelemetryGenerator>,
    /// Live stream cadence and buffering.
    pub stream: StreamSettings,
    /// Origins allowed by CORS. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl AppState {
    /// Create state with default settings.
    pub fn new() -> Self {
        Self::from_config(&PitlaneConfig::default())
    }

    /// Create state from loaded configuration.
    pub fn from_config(config: &PitlaneConfig) -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::with_send_timeout(
                config.stream.send_timeout(),
            )),
            generator: Arc::new(TelemetryGenerator::new(config.telemetry.clone())),
            stream: config.stream.clone(),
            cors_origins: config.server.cors_origins.clone(),
        }
    }

    /// Override the live tick interval. Mostly useful in tests.
    #[must_use]
    pub const fn with_tick_interval_ms(mut self, tick_interval_ms: u64) -> Self {
        self.stream.tick_interval_ms = tick_interval_ms;
        self
    }

    /// Inputs for a new live stream loop.
    pub fn stream_spec(&self) -> StreamSpec {
        StreamSpec {
            generator: Arc::clone(&self.generator),
            drivers: drivers(),
            tick_interval: self.stream.tick_interval(),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
