//! Messages pushed over the live telemetry `WebSocket`.
//!
//! Every text frame on `/ws/live/{session_id}` is one [`LiveMessage`],
//! discriminated by its `type` field.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::structs::Position;

/// A single message on the live socket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LiveMessage {
    /// One tick of multi-driver telemetry for the connection's session.
    Telemetry(TelemetryFrame),
    /// An operator announcement sent to every connected client.
    RaceControl(RaceControlMessage),
}

/// One tick of telemetry covering every driver in the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TelemetryFrame {
    /// The session identifier the client subscribed with, echoed verbatim.
    pub session_id: String,
    /// Wall-clock time the frame was generated.
    pub timestamp: DateTime<Utc>,
    /// One sample per driver, in driver-table order.
    pub drivers: Vec<DriverSample>,
}

/// A driver's state within one [`TelemetryFrame`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DriverSample {
    /// Driver code.
    pub driver_id: String,
    /// Car position.
    pub position: Position,
    /// Speed in km/h.
    pub speed: f64,
    /// Throttle application in percent.
    pub throttle: f64,
    /// Brake application in percent.
    pub brake: f64,
    /// Current lap number.
    pub lap: u32,
    /// Current sector (1-3).
    pub sector: u8,
}

/// An operator announcement broadcast to all live clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RaceControlMessage {
    /// When the announcement was issued.
    pub timestamp: DateTime<Utc>,
    /// Announcement text.
    pub message: String,
}

impl From<TelemetryFrame> for LiveMessage {
    fn from(frame: TelemetryFrame) -> Self {
        Self::Telemetry(frame)
    }
}

impl From<RaceControlMessage> for LiveMessage {
    fn from(message: RaceControlMessage) -> Self {
        Self::RaceControl(message)
    }
}
