//! Configuration loading and typed config structures for Pitlane.
//!
//! The configuration lives in `pitlane-config.yaml` next to the binary's
//! working directory. Every section and field is optional; missing values
//! fall back to the defaults the dashboard expects (port 8000, 100 ms live
//! ticks, Monaco-centred telemetry).

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::telemetry::TelemetryRanges;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A telemetry range is unusable.
    #[error("invalid telemetry range `{field}`: {reason}")]
    InvalidRange {
        /// The offending field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// A stream setting is unusable.
    #[error("invalid stream setting `{field}`: must be greater than zero")]
    InvalidStream {
        /// The offending field.
        field: &'static str,
    },

    /// An environment override could not be parsed.
    #[error("invalid environment override {name}: {reason}")]
    Env {
        /// Variable name.
        name: &'static str,
        /// Parse failure description.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
///
/// Mirrors the structure of `pitlane-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PitlaneConfig {
    /// HTTP listener and CORS settings.
    #[serde(default)]
    pub server: ServerSettings,

    /// Live stream cadence and buffering.
    #[serde(default)]
    pub stream: StreamSettings,

    /// Ranges for generated telemetry.
    #[serde(default)]
    pub telemetry: TelemetryRanges,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingSettings,
}

impl PitlaneConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides and validate.
    ///
    /// - `PITLANE_HOST` overrides `server.host`
    /// - `PITLANE_PORT` overrides `server.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if it is not valid YAML, or a validation error.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.server.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string. Environment
    /// overrides are not applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or a
    /// validation error.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        // An empty document deserializes to unit, not to an empty mapping.
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every section for unusable values.
    ///
    /// # Errors
    ///
    /// Returns the first validation failure found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.stream.validate()?;
        self.telemetry.validate()
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerSettings {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl ServerSettings {
    /// Override the bind address from the environment when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] if `PITLANE_PORT` is not a valid port.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("PITLANE_HOST") {
            self.host = val;
        }
        if let Ok(val) = std::env::var("PITLANE_PORT") {
            self.port = val.parse().map_err(|e| ConfigError::Env {
                name: "PITLANE_PORT",
                reason: format!("{e}"),
            })?;
        }
        Ok(())
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
        }
    }
}

/// Live stream settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StreamSettings {
    /// Milliseconds between frames on one connection.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Capacity of each connection's outbound message queue.
    #[serde(default = "default_outbound_queue")]
    pub outbound_queue: usize,

    /// Milliseconds a frame may wait for queue space before the connection
    /// is treated as dead.
    #[serde(default = "default_send_timeout_ms")]
    pub send_timeout_ms: u64,
}

impl StreamSettings {
    /// The tick interval as a [`Duration`].
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    /// The delivery deadline as a [`Duration`].
    pub const fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidStream {
                field: "tick_interval_ms",
            });
        }
        if self.outbound_queue == 0 {
            return Err(ConfigError::InvalidStream {
                field: "outbound_queue",
            });
        }
        if self.send_timeout_ms == 0 {
            return Err(ConfigError::InvalidStream {
                field: "send_timeout_ms",
            });
        }
        Ok(())
    }
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            outbound_queue: default_outbound_queue(),
            send_timeout_ms: default_send_timeout_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingSettings {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

const fn default_port() -> u16 {
    8000
}

fn default_cors_origins() -> Vec<String> {
    vec![
        String::from("http://localhost:5173"),
        String::from("http://localhost:3000"),
        String::from("http://127.0.0.1:5173"),
    ]
}

const fn default_tick_interval_ms() -> u64 {
    100
}

const fn default_outbound_queue() -> usize {
    32
}

const fn default_send_timeout_ms() -> u64 {
    5_000
}

fn default_log_level() -> String {
    String::from("info")
}
