//! REST API endpoint handlers.
//!
//! Reference data comes from the static tables; everything else is
//! generated fresh on each request. No handler awaits while holding an RNG.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Service banner |
//! | `GET` | `/api/drivers` | List all drivers |
//! | `GET` | `/api/drivers/{id}` | Single driver |
//! | `GET` | `/api/circuit` | Circuit outline |
//! | `GET` | `/api/sessions` | List sessions |
//! | `GET` | `/api/sessions/{id}` | Session detail |
//! | `GET` | `/api/telemetry/{session}/{driver}` | Historical trace |
//! | `GET` | `/api/leaderboard/{session}` | Timing table |
//! | `GET` | `/api/analysis/{session}/{driver}` | Driver analysis |
//! | `GET` | `/api/comparison/{session}` | Head-to-head stats |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use pitlane_data::{analysis, tables, timing};
use pitlane_types::{
    Circuit, Driver, DriverAnalysis, DriverComparison, LeaderboardEntry, RaceSession,
    TelemetrySample,
};

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for `GET /api/telemetry/{session_id}/{driver_id}`.
#[derive(Debug, serde::Deserialize)]
pub struct TelemetryQuery {
    /// Lap number to echo on each sample.
    pub lap: Option<u32>,
}

/// Query parameters for `GET /api/comparison/{session_id}`.
#[derive(Debug, serde::Deserialize)]
pub struct ComparisonQuery {
    /// First driver code.
    pub driver1: Option<String>,
    /// Second driver code.
    pub driver2: Option<String>,
}

/// Response body for `GET /`.
#[derive(Debug, serde::Serialize)]
pub struct ServiceInfo {
    /// Service name.
    pub message: &'static str,
    /// API version.
    pub version: &'static str,
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

/// Service banner.
pub async fn index() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "F1 Analytics API",
        version: "1.0.0",
    })
}

/// List all drivers.
pub async fn list_drivers() -> Json<&'static [Driver]> {
    Json(tables::drivers())
}

/// Fetch one driver by code.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] for an unknown code.
pub async fn get_driver(Path(driver_id): Path<String>) -> Result<Json<Driver>, ApiError> {
    Ok(Json(tables::driver(&driver_id)?.clone()))
}

/// The circuit outline.
pub async fn get_circuit() -> Json<&'static Circuit> {
    Json(tables::circuit())
}

/// List all sessions.
pub async fn list_sessions() -> Json<Vec<RaceSession>> {
    Json(tables::sessions())
}

/// Fetch one session with its detail fields.
///
/// # Errors
///
/// Returns [`ApiError::NotFound`] for an unknown session.
pub async fn get_session(Path(session_id): Path<String>) -> Result<Json<RaceSession>, ApiError> {
    Ok(Json(tables::session(&session_id)?))
}

// ---------------------------------------------------------------------------
// Generated data
// ---------------------------------------------------------------------------

/// A historical telemetry trace for one driver, starting now.
pub async fn get_telemetry(
    State(state): State<Arc<AppState>>,
    Path((_session_id, driver_id)): Path<(String, String)>,
    Query(query): Query<TelemetryQuery>,
) -> Json<Vec<TelemetrySample>> {
    let start = unix_seconds(Utc::now());
    let samples = state
        .generator
        .history(&mut rand::rng(), &driver_id, query.lap, start);
    Json(samples)
}

/// The timing table for a session.
pub async fn get_leaderboard(Path(_session_id): Path<String>) -> Json<Vec<LeaderboardEntry>> {
    Json(timing::leaderboard(&mut rand::rng(), tables::drivers()))
}

/// Braking, throttle, and speed analysis for one driver.
pub async fn get_analysis(
    State(state): State<Arc<AppState>>,
    Path((session_id, driver_id)): Path<(String, String)>,
) -> Json<DriverAnalysis> {
    Json(analysis::driver_analysis(
        &mut rand::rng(),
        &state.generator,
        &session_id,
        &driver_id,
    ))
}

/// Head-to-head stats for two drivers.
///
/// # Errors
///
/// Returns [`ApiError::InvalidRequest`] if either driver is missing.
pub async fn get_comparison(
    Path(session_id): Path<String>,
    Query(query): Query<ComparisonQuery>,
) -> Result<Json<DriverComparison>, ApiError> {
    let driver1 = required(query.driver1, "driver1")?;
    let driver2 = required(query.driver2, "driver2")?;
    Ok(Json(timing::comparison(
        &mut rand::rng(),
        &session_id,
        &driver1,
        &driver2,
    )))
}

fn required(value: Option<String>, name: &str) -> Result<String, ApiError> {
    value
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::InvalidRequest(format!("{name} is required")))
}

fn unix_seconds(now: DateTime<Utc>) -> f64 {
    now.signed_duration_since(DateTime::UNIX_EPOCH)
        .to_std()
        .map_or(0.0, |d| d.as_secs_f64())
}
