//! Background server startup.
//!
//! [`spawn_server`] binds eagerly, then serves on a Tokio task. The
//! returned [`ServerHandle`] reports the bound address (useful with port 0)
//! and triggers graceful shutdown.
//!
//! # Usage
//!
//! ```rust,ignore
//! use pitlane_live::startup::spawn_server;
//! use pitlane_live::state::AppState;
//! use std::sync::Arc;
//!
//! let handle = spawn_server(&config.server, Arc::new(AppState::from_config(&config))).await?;
//! tokio::signal::ctrl_c().await?;
//! handle.shutdown().await;
//! ```

use std::net::SocketAddr;
use std::sync::Arc;

use pitlane_data::ServerSettings;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::server::{ServerError, bind, serve};
use crate::state::AppState;

/// Errors that can occur when spawning the server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),

    /// The bound listener did not report its address.
    #[error("failed to read local address: {0}")]
    LocalAddr(#[from] std::io::Error),
}

/// A server running on a background task.
#[derive(Debug)]
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    join: JoinHandle<()>,
}

impl ServerHandle {
    /// The address the server is listening on.
    pub const fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections and wait for the server task to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.join.await {
            tracing::error!(error = %e, "server task failed");
        }
    }
}

/// Spawn the HTTP + `WebSocket` server on a background Tokio task.
///
/// # Errors
///
/// Returns [`StartupError::Server`] if the listener cannot bind. This is
/// detected before the task is spawned.
pub async fn spawn_server(
    settings: &ServerSettings,
    state: Arc<AppState>,
) -> Result<ServerHandle, StartupError> {
    let listener = bind(settings).await?;
    let local_addr = listener.local_addr()?;
    let (shutdown, signal) = oneshot::channel::<()>();

    let join = tokio::spawn(async move {
        let stop = async move {
            let _ = signal.await;
        };
        if let Err(e) = serve(listener, state, stop).await {
            tracing::error!(error = %e, "server exited with error");
        }
    });

    tracing::info!(%local_addr, "server spawned on background task");

    Ok(ServerHandle {
        local_addr,
        shutdown,
        join,
    })
}
