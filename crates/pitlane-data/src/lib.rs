//! Reference data, synthetic generators, and configuration for Pitlane.
//!
//! Nothing in this crate performs I/O beyond reading the config file. The
//! tables are immutable and the generators take the caller's RNG, so the
//! live stream tasks and REST handlers can share them freely.
//!
//! # Modules
//!
//! - [`tables`] -- Drivers, the Monaco circuit, and race sessions
//! - [`telemetry`] -- Live frames and historical traces
//! - [`timing`] -- Leaderboards and driver comparisons
//! - [`analysis`] -- Per-driver braking, throttle, and speed analysis
//! - [`config`] -- `pitlane-config.yaml` loading

pub mod analysis;
pub mod config;
pub mod error;
pub mod tables;
pub mod telemetry;
pub mod timing;

pub use config::{ConfigError, LoggingSettings, PitlaneConfig, ServerSettings, StreamSettings};
pub use error::DataError;
pub use telemetry::{TelemetryGenerator, TelemetryRanges, ValueRange};
