//! Live stream control endpoints.
//!
//! Operators use these to inspect the active connection set and push
//! race-control announcements to every connected client.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/live` | Active connections and delivery health |
//! | `POST` | `/api/live/broadcast` | Send a race-control message to all clients |

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use pitlane_types::{LiveMessage, RaceControlMessage};
use tracing::info;

use crate::error::ApiError;
use crate::registry::BroadcastReport;
use crate::state::AppState;

/// Request body for `POST /api/live/broadcast`.
#[derive(Debug, serde::Deserialize)]
pub struct BroadcastRequest {
    /// Announcement text.
    pub message: String,
}

/// Response body for `GET /api/live`.
#[derive(Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct LiveStatus {
    /// Number of connections currently streaming.
    pub active_connections: usize,
    /// Connection count per subscribed session id.
    pub sessions: BTreeMap<String, usize>,
    /// Broadcast deliveries that failed since startup.
    pub delivery_failures: u64,
    /// Milliseconds between frames on each connection.
    pub tick_interval_ms: u64,
}

// ---------------------------------------------------------------------------
// GET /api/live
// ---------------------------------------------------------------------------

/// Report the active connection set.
pub async fn status(State(state): State<Arc<AppState>>) -> Json<LiveStatus> {
    Json(LiveStatus {
        active_connections: state.registry.active_count(),
        sessions: state.registry.sessions(),
        delivery_failures: state.registry.delivery_failures(),
        tick_interval_ms: state.stream.tick_interval_ms,
    })
}

// ---------------------------------------------------------------------------
// POST /api/live/broadcast
// ---------------------------------------------------------------------------

/// Broadcast a race-control message to every live client.
///
/// Clients that are gone or backed up are skipped and counted as failed;
/// the rest still receive the message.
///
/// # Errors
///
/// Returns [`ApiError::InvalidRequest`] if the message is blank.
pub async fn broadcast(
    State(state): State<Arc<AppState>>,
    Json(body): Json<BroadcastRequest>,
) -> Result<Json<BroadcastReport>, ApiError> {
    let text = body.message.trim();
    if text.is_empty() {
        return Err(ApiError::InvalidRequest(String::from(
            "message must not be empty",
        )));
    }

    let message = LiveMessage::from(RaceControlMessage {
        timestamp: Utc::now(),
        message: text.to_owned(),
    });
    let report = state.registry.broadcast(&message);

    info!(
        delivered = report.delivered,
        failed = report.failed,
        "race control message broadcast"
    );
    Ok(Json(report))
}
