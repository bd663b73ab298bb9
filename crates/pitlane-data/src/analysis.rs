//! Per-driver session analysis.
//!
//! Braking zones sit on fixed circuit corners; everything else is drawn
//! fresh on each request.

use pitlane_types::{BrakingPoint, CornerSpeed, DriverAnalysis, SpeedMapPoint, ThrottlePoint};
use rand::Rng;

use crate::tables::circuit_point;
use crate::telemetry::{TelemetryGenerator, ValueRange};

/// Corners with a heavy braking zone.
const BRAKING_CORNERS: [&str; 3] = ["Turn 2", "Turn 5", "Turn 8"];

/// Number of named corners on the circuit.
const CORNER_COUNT: u32 = 19;

const THROTTLE_TRACE_POINTS: u32 = 100;
const SPEED_MAP_POINTS: usize = 50;

const INTENSITY: ValueRange<f64> = ValueRange::new(0.3, 1.0);
const CORNER_SPEED: ValueRange<f64> = ValueRange::new(80.0, 200.0);

/// Build the analysis for one driver. Identifiers are echoed as given.
pub fn driver_analysis<R: Rng>(
    rng: &mut R,
    generator: &TelemetryGenerator,
    session_id: &str,
    driver_id: &str,
) -> DriverAnalysis {
    let ranges = generator.ranges();

    let braking_points = BRAKING_CORNERS
        .iter()
        .filter_map(|name| circuit_point(name))
        .map(|point| BrakingPoint {
            lat: point.lat,
            lng: point.lng,
            intensity: INTENSITY.sample(rng),
        })
        .collect();

    let throttle_control = (0..THROTTLE_TRACE_POINTS)
        .map(|i| ThrottlePoint {
            timestamp: f64::from(i) * 0.1,
            throttle: ranges.throttle.sample(rng),
        })
        .collect();

    let corner_speeds = (1..=CORNER_COUNT)
        .map(|n| CornerSpeed {
            corner: format!("Turn {n}"),
            speed: CORNER_SPEED.sample(rng),
        })
        .collect();

    let speed_map = (0..SPEED_MAP_POINTS)
        .map(|_| {
            let position = generator.position(rng);
            SpeedMapPoint {
                lat: position.lat,
                lng: position.lng,
                speed: ranges.speed.sample(rng),
            }
        })
        .collect();

    DriverAnalysis {
        driver_id: driver_id.to_owned(),
        session_id: session_id.to_owned(),
        braking_points,
        throttle_control,
        corner_speeds,
        speed_map,
    }
}
