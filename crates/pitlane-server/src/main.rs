//! Pitlane server binary.
//!
//! Serves the F1 dashboard's REST API and live telemetry `WebSocket`.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `pitlane-config.yaml` (or `PITLANE_CONFIG`)
//! 2. Initialize structured logging (tracing)
//! 3. Bind and spawn the HTTP server
//! 4. Wait for `Ctrl-C`, then shut down gracefully

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use pitlane_data::PitlaneConfig;
use pitlane_live::state::AppState;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::ServiceError;

/// Default config file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "pitlane-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the listener cannot bind,
/// or the shutdown signal cannot be installed.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (config, source) = load_config()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!("pitlane-server starting");
    info!(
        source = %source,
        host = config.server.host,
        port = config.server.port,
        tick_interval_ms = config.stream.tick_interval_ms,
        outbound_queue = config.stream.outbound_queue,
        "Configuration loaded"
    );

    let state = Arc::new(AppState::from_config(&config));
    let server = pitlane_live::spawn_server(&config.server, state)
        .await
        .map_err(ServiceError::from)?;
    info!(addr = %server.local_addr(), "Pitlane server started");

    tokio::signal::ctrl_c().await.map_err(ServiceError::from)?;
    info!("Shutdown signal received");

    server.shutdown().await;
    info!("pitlane-server stopped");
    Ok(())
}

/// Load configuration from `PITLANE_CONFIG` or the default path.
///
/// A missing file falls back to defaults with environment overrides still
/// applied. Returns the config and a description of where it came from.
fn load_config() -> Result<(PitlaneConfig, String), ServiceError> {
    let path = std::env::var_os("PITLANE_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    if path.exists() {
        let config = PitlaneConfig::from_file(&path)?;
        Ok((config, path.display().to_string()))
    } else {
        let mut config = PitlaneConfig::default();
        config.server.apply_env_overrides()?;
        Ok((config, String::from("defaults")))
    }
}
