//! Axum router construction.
//!
//! Assembles the REST, live control, and `WebSocket` routes into a single
//! [`Router`] behind CORS and request tracing.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::state::AppState;
use crate::{control, handlers, ws};

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET /` -- service banner
/// - `GET /ws/live/{session_id}` -- live telemetry stream
/// - `GET /api/drivers`, `GET /api/drivers/{id}`
/// - `GET /api/circuit`
/// - `GET /api/sessions`, `GET /api/sessions/{id}`
/// - `GET /api/telemetry/{session_id}/{driver_id}`
/// - `GET /api/leaderboard/{session_id}`
/// - `GET /api/analysis/{session_id}/{driver_id}`
/// - `GET /api/comparison/{session_id}`
/// - `GET /api/live`, `POST /api/live/broadcast`
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins(&state.cors_origins))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handlers::index))
        // WebSocket
        .route("/ws/live/{session_id}", get(ws::ws_live))
        // Reference data
        .route("/api/drivers", get(handlers::list_drivers))
        .route("/api/drivers/{id}", get(handlers::get_driver))
        .route("/api/circuit", get(handlers::get_circuit))
        .route("/api/sessions", get(handlers::list_sessions))
        .route("/api/sessions/{id}", get(handlers::get_session))
        // Generated data
        .route(
            "/api/telemetry/{session_id}/{driver_id}",
            get(handlers::get_telemetry),
        )
        .route("/api/leaderboard/{session_id}", get(handlers::get_leaderboard))
        .route(
            "/api/analysis/{session_id}/{driver_id}",
            get(handlers::get_analysis),
        )
        .route("/api/comparison/{session_id}", get(handlers::get_comparison))
        // Live control
        .route("/api/live", get(control::status))
        .route("/api/live/broadcast", post(control::broadcast))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Parse configured origins. An empty list allows any origin; entries that
/// are not valid header values are skipped.
fn allowed_origins(origins: &[String]) -> AllowOrigin {
    if origins.is_empty() {
        return AllowOrigin::from(Any);
    }
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin, error = %e, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    AllowOrigin::list(parsed)
}
