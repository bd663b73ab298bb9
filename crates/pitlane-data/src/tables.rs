//! Static reference tables: drivers, the Monaco circuit, and race sessions.
//!
//! Every table is built once on first access and shared read-only for the
//! life of the process, so live stream tasks read them without locking.

use std::sync::LazyLock;

use pitlane_types::{Circuit, CircuitPoint, Driver, RaceSession, SessionStatus};

use crate::error::DataError;

/// Scheduled race distance for every session, in laps.
pub const LAP_COUNT: u32 = 78;

/// Placeholder duration reported on session detail.
const SESSION_DURATION: &str = "1:23:45.123";

/// Circuit name shared by all sessions.
const CIRCUIT_NAME: &str = "Circuit de Monaco";

/// `(id, name, team, number, color)`
const DRIVER_ROWS: [(&str, &str, &str, u32, &str); 10] = [
    ("HAM", "Lewis Hamilton", "Mercedes", 44, "#00D2BE"),
    ("VER", "Max Verstappen", "Red Bull Racing", 1, "#0600EF"),
    ("PER", "Sergio Perez", "Red Bull Racing", 11, "#0600EF"),
    ("LEC", "Charles Leclerc", "Ferrari", 16, "#DC0000"),
    ("SAI", "Carlos Sainz", "Ferrari", 55, "#DC0000"),
    ("NOR", "Lando Norris", "McLaren", 4, "#FF8700"),
    ("PIA", "Oscar Piastri", "McLaren", 81, "#FF8700"),
    ("ALO", "Fernando Alonso", "Aston Martin", 14, "#006F62"),
    ("STR", "Lance Stroll", "Aston Martin", 18, "#006F62"),
    ("RUS", "George Russell", "Mercedes", 63, "#00D2BE"),
];

/// `(lat, lng, name)`, start/finish first.
const CIRCUIT_ROWS: [(f64, f64, &str); 20] = [
    (43.7347, 7.4206, "Start/Finish"),
    (43.7345, 7.4208, "Turn 1"),
    (43.7340, 7.4215, "Turn 2"),
    (43.7335, 7.4220, "Turn 3"),
    (43.7330, 7.4225, "Turn 4"),
    (43.7325, 7.4230, "Turn 5"),
    (43.7320, 7.4235, "Turn 6"),
    (43.7315, 7.4240, "Turn 7"),
    (43.7310, 7.4245, "Turn 8"),
    (43.7305, 7.4250, "Turn 9"),
    (43.7300, 7.4255, "Turn 10"),
    (43.7295, 7.4260, "Turn 11"),
    (43.7290, 7.4265, "Turn 12"),
    (43.7285, 7.4270, "Turn 13"),
    (43.7280, 7.4275, "Turn 14"),
    (43.7275, 7.4280, "Turn 15"),
    (43.7270, 7.4285, "Turn 16"),
    (43.7265, 7.4290, "Turn 17"),
    (43.7260, 7.4295, "Turn 18"),
    (43.7255, 7.4300, "Turn 19"),
];

/// `(id, name, date, status)`
const SESSION_ROWS: [(&str, &str, &str, SessionStatus); 2] = [
    (
        "monaco_2024_q3",
        "Monaco GP 2024 - Qualifying Q3",
        "2024-05-25",
        SessionStatus::Completed,
    ),
    (
        "monaco_2024_race",
        "Monaco GP 2024 - Race",
        "2024-05-26",
        SessionStatus::Live,
    ),
];

static DRIVERS: LazyLock<Vec<Driver>> = LazyLock::new(|| {
    DRIVER_ROWS
        .iter()
        .map(|&(id, name, team, number, color)| Driver {
            id: id.to_owned(),
            name: name.to_owned(),
            team: team.to_owned(),
            number,
            color: color.to_owned(),
        })
        .collect()
});

static CIRCUIT: LazyLock<Circuit> = LazyLock::new(|| Circuit {
    points: CIRCUIT_ROWS
        .iter()
        .map(|&(lat, lng, name)| CircuitPoint {
            lat,
            lng,
            name: name.to_owned(),
        })
        .collect(),
});

/// The full driver field in table order.
pub fn drivers() -> &'static [Driver] {
    &DRIVERS
}

/// Look up a driver by code.
pub fn driver(id: &str) -> Result<&'static Driver, DataError> {
    drivers()
        .iter()
        .find(|d| d.id == id)
        .ok_or_else(|| DataError::DriverNotFound(id.to_owned()))
}

/// The Monaco circuit polyline.
pub fn circuit() -> &'static Circuit {
    &CIRCUIT
}

/// Find a circuit point by name (e.g. `Turn 5`).
pub fn circuit_point(name: &str) -> Option<&'static CircuitPoint> {
    circuit().points.iter().find(|p| p.name == name)
}

/// All sessions in summary form (no lap count or duration).
pub fn sessions() -> Vec<RaceSession> {
    SESSION_ROWS
        .iter()
        .map(|&(id, name, date, status)| RaceSession {
            id: id.to_owned(),
            name: name.to_owned(),
            circuit: CIRCUIT_NAME.to_owned(),
            date: date.to_owned(),
            status,
            drivers: drivers().to_vec(),
            lap_count: None,
            duration: None,
        })
        .collect()
}

/// Full detail for one session.
pub fn session(id: &str) -> Result<RaceSession, DataError> {
    sessions()
        .into_iter()
        .find(|s| s.id == id)
        .map(|mut s| {
            s.lap_count = Some(LAP_COUNT);
            s.duration = Some(SESSION_DURATION.to_owned());
            s
        })
        .ok_or_else(|| DataError::SessionNotFound(id.to_owned()))
}
