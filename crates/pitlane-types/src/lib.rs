//! Shared type definitions for the Pitlane F1 telemetry API.
//!
//! This crate is the single source of truth for every JSON shape the API
//! emits. Types flow downstream to `TypeScript` via `ts-rs` for the race
//! dashboard.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers (live connection identity)
//! - [`enums`] -- Session status
//! - [`structs`] -- Drivers, circuit, sessions, leaderboard, analysis
//! - [`live`] -- Messages pushed over the live telemetry `WebSocket`

pub mod enums;
pub mod ids;
pub mod live;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::SessionStatus;
pub use ids::ConnectionId;
pub use live::{DriverSample, LiveMessage, RaceControlMessage, TelemetryFrame};
pub use structs::{
    BrakingPoint, Circuit, CircuitPoint, CornerSpeed, Driver, DriverAnalysis, DriverComparison,
    DriverStats, LeaderboardEntry, Position, RaceSession, SpeedMapPoint, TelemetrySample,
    ThrottlePoint,
};
