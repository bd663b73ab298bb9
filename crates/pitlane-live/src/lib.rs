//! HTTP and live telemetry server for the Pitlane F1 dashboard.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/live/{session_id}`) streaming one
//!   multi-driver telemetry frame per tick to each client
//! - **REST endpoints** for drivers, the circuit, sessions, and generated
//!   telemetry, timing, and analysis
//! - **Live control endpoints** (`/api/live`) for connection status and
//!   race-control broadcasts
//!
//! # Architecture
//!
//! Every live client gets its own stream loop ([`stream::run_stream`])
//! and its own bounded outbound queue drained by a socket writer task. The
//! loops share one [`ConnectionRegistry`] that tracks who is connected and
//! fans broadcasts out without letting one slow client block the rest.

pub mod control;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod stream;
pub mod ws;

pub use error::ApiError;
pub use registry::{
    BroadcastReport, ConnectionRegistry, DeliveryError, LiveConnection, Outbound, Registration,
    RegistryError,
};
pub use router::build_router;
pub use server::ServerError;
pub use startup::{ServerHandle, StartupError, spawn_server};
pub use state::AppState;
pub use stream::{InboundEvent, StreamEnd, StreamSpec, run_stream};
