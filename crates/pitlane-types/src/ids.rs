//! Type-safe identifier wrapper around [`Uuid`].
//!
//! Live connections are the only entities with generated identities. The
//! drivers and sessions are keyed by the short string codes the front end
//! already uses (`"HAM"`, `"monaco_2024_race"`).

use std::fmt;

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Unique identifier for one admitted live-telemetry `WebSocket` client.
///
/// Generated as a time-ordered UUID v7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    /// A fresh identifier for a new connection.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
