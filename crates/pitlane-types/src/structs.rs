//! Reference and analysis structs served by the REST endpoints.
//!
//! Field names match the JSON the dashboard consumes, so these types
//! serialize without any renaming.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::SessionStatus;

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

/// A driver entered in the championship.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Driver {
    /// Three-letter driver code (e.g. `HAM`).
    pub id: String,
    /// Full display name.
    pub name: String,
    /// Constructor name.
    pub team: String,
    /// Car number.
    pub number: u32,
    /// Team livery color as a hex string (e.g. `#00D2BE`).
    pub color: String,
}

/// A geographic coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

/// One named point of the circuit polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CircuitPoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Corner or landmark name.
    pub name: String,
}

/// The circuit layout wrapper returned by `GET /api/circuit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Circuit {
    /// Ordered polyline, start/finish first.
    pub points: Vec<CircuitPoint>,
}

/// A race weekend session.
///
/// The list endpoint omits `lap_count` and `duration`; the detail endpoint
/// fills them in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RaceSession {
    /// Session identifier (e.g. `monaco_2024_race`).
    pub id: String,
    /// Human-readable session name.
    pub name: String,
    /// Circuit name.
    pub circuit: String,
    /// Session date (`YYYY-MM-DD`).
    pub date: String,
    /// Current status.
    pub status: SessionStatus,
    /// Drivers entered in the session.
    pub drivers: Vec<Driver>,
    /// Scheduled race distance in laps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub lap_count: Option<u32>,
    /// Session duration (`H:MM:SS.mmm`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub duration: Option<String>,
}

// ---------------------------------------------------------------------------
// Telemetry history
// ---------------------------------------------------------------------------

/// One historical telemetry sample for a single driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TelemetrySample {
    /// Driver code.
    pub driver_id: String,
    /// Unix timestamp in fractional seconds.
    pub timestamp: f64,
    /// Car position.
    pub position: Position,
    /// Speed in km/h.
    pub speed: f64,
    /// Throttle application in percent.
    pub throttle: f64,
    /// Brake application in percent.
    pub brake: f64,
    /// Steering input, -1 (full left) to 1 (full right).
    pub steering: f64,
    /// Selected gear.
    pub gear: u8,
    /// Engine speed.
    pub rpm: u32,
    /// Completed lap time in seconds, present only on lap boundaries.
    pub lap_time: Option<f64>,
    /// Track sector (1-3).
    pub sector: u8,
    /// Requested lap, echoed when the caller filtered by lap.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub lap: Option<u32>,
}

// ---------------------------------------------------------------------------
// Leaderboard
// ---------------------------------------------------------------------------

/// One row of the session leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LeaderboardEntry {
    /// Classified position, starting at 1.
    pub position: u32,
    /// The driver in this position.
    pub driver: Driver,
    /// Current lap time in seconds (sort key).
    pub lap_time: f64,
    /// Gap to the leader in seconds.
    pub gap: f64,
    /// Last lap time in seconds.
    pub last_lap: f64,
    /// Best lap time in seconds.
    pub best_lap: f64,
    /// Laps completed so far.
    pub laps_completed: u32,
}

// ---------------------------------------------------------------------------
// Driver analysis
// ---------------------------------------------------------------------------

/// A braking zone on the circuit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BrakingPoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Braking intensity, 0 to 1.
    pub intensity: f64,
}

/// Throttle application at a moment in the lap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ThrottlePoint {
    /// Seconds since the start of the trace.
    pub timestamp: f64,
    /// Throttle in percent.
    pub throttle: f64,
}

/// Minimum speed through a named corner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CornerSpeed {
    /// Corner name (e.g. `Turn 7`).
    pub corner: String,
    /// Speed in km/h.
    pub speed: f64,
}

/// A speed reading pinned to a coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SpeedMapPoint {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
    /// Speed in km/h.
    pub speed: f64,
}

/// Per-driver session analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DriverAnalysis {
    /// Driver code as requested.
    pub driver_id: String,
    /// Session identifier as requested.
    pub session_id: String,
    /// Braking zones.
    pub braking_points: Vec<BrakingPoint>,
    /// Throttle trace.
    pub throttle_control: Vec<ThrottlePoint>,
    /// Corner minimum speeds.
    pub corner_speeds: Vec<CornerSpeed>,
    /// Speed heat map.
    pub speed_map: Vec<SpeedMapPoint>,
}

// ---------------------------------------------------------------------------
// Driver comparison
// ---------------------------------------------------------------------------

/// Aggregate pace statistics for one driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DriverStats {
    /// Driver code.
    pub id: String,
    /// Average lap time in seconds.
    pub avg_lap_time: f64,
    /// Best lap time in seconds.
    pub best_lap_time: f64,
    /// Top speed in km/h.
    pub top_speed: f64,
    /// Average speed in km/h.
    pub avg_speed: f64,
    /// Lap-time consistency score, 0 to 1.
    pub consistency: f64,
}

/// Head-to-head comparison of two drivers in one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DriverComparison {
    /// Session identifier as requested.
    pub session_id: String,
    /// First driver.
    pub driver1: DriverStats,
    /// Second driver.
    pub driver2: DriverStats,
}
