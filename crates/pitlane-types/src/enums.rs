//! Enumeration types shared by the REST and live surfaces.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Lifecycle status of a race session as shown in the session picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// The session is running and streams live telemetry.
    Live,
    /// The session has finished.
    Completed,
    /// The session is scheduled but has not started.
    Upcoming,
}

impl core::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::Live => "live",
            Self::Completed => "completed",
            Self::Upcoming => "upcoming",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_lowercase() {
        let json = serde_json::to_string(&SessionStatus::Live).ok();
        assert_eq!(json.as_deref(), Some("\"live\""));
    }

    #[test]
    fn display_matches_wire_name() {
        for status in [
            SessionStatus::Live,
            SessionStatus::Completed,
            SessionStatus::Upcoming,
        ] {
            let wire = serde_json::to_string(&status).unwrap_or_default();
            assert_eq!(wire.trim_matches('"'), status.to_string());
        }
    }
}
