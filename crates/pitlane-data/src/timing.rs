//! Randomized timing tables: leaderboards and head-to-head comparisons.

use pitlane_types::{Driver, DriverComparison, DriverStats, LeaderboardEntry};
use rand::Rng;

use crate::tables::LAP_COUNT;
use crate::telemetry::ValueRange;

const LAP_TIME: ValueRange<f64> = ValueRange::new(70.0, 85.0);
const BEST_LAP: ValueRange<f64> = ValueRange::new(68.0, 75.0);
const GAP: ValueRange<f64> = ValueRange::new(0.0, 15.0);
const LAPS_COMPLETED: ValueRange<u32> = ValueRange::new(1, LAP_COUNT);
const TOP_SPEED: ValueRange<f64> = ValueRange::new(280.0, 320.0);
const AVG_SPEED: ValueRange<f64> = ValueRange::new(150.0, 200.0);
const CONSISTENCY: ValueRange<f64> = ValueRange::new(0.8, 1.0);

/// Build a leaderboard for the given field, ordered by current lap time
/// with positions renumbered from 1.
pub fn leaderboard<R: Rng>(rng: &mut R, drivers: &[Driver]) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = drivers
        .iter()
        .map(|driver| LeaderboardEntry {
            position: 0,
            driver: driver.clone(),
            lap_time: LAP_TIME.sample(rng),
            gap: GAP.sample(rng),
            last_lap: LAP_TIME.sample(rng),
            best_lap: BEST_LAP.sample(rng),
            laps_completed: LAPS_COMPLETED.sample(rng),
        })
        .collect();

    entries.sort_by(|a, b| a.lap_time.total_cmp(&b.lap_time));
    for (position, entry) in (1_u32..).zip(entries.iter_mut()) {
        entry.position = position;
    }
    entries
}

/// Aggregate pace statistics for one driver code.
pub fn driver_stats<R: Rng>(rng: &mut R, driver_id: &str) -> DriverStats {
    DriverStats {
        id: driver_id.to_owned(),
        avg_lap_time: LAP_TIME.sample(rng),
        best_lap_time: BEST_LAP.sample(rng),
        top_speed: TOP_SPEED.sample(rng),
        avg_speed: AVG_SPEED.sample(rng),
        consistency: CONSISTENCY.sample(rng),
    }
}

/// Compare two drivers within a session. Codes are echoed, not validated.
pub fn comparison<R: Rng>(
    rng: &mut R,
    session_id: &str,
    driver1: &str,
    driver2: &str,
) -> DriverComparison {
    DriverComparison {
        session_id: session_id.to_owned(),
        driver1: driver_stats(rng, driver1),
        driver2: driver_stats(rng, driver2),
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::tables::drivers;

    #[test]
    fn leaderboard_sorted_and_numbered() {
        let mut rng = StdRng::seed_from_u64(11);
        let board = leaderboard(&mut rng, drivers());

        assert_eq!(board.len(), 10);
        let positions: Vec<u32> = board.iter().map(|e| e.position).collect();
        assert_eq!(positions, (1..=10).collect::<Vec<u32>>());
        assert!(board.windows(2).all(|w| match w {
            [a, b] => a.lap_time <= b.lap_time,
            _ => true,
        }));
        assert!(board.iter().all(|e| LAPS_COMPLETED.contains(e.laps_completed)));
        assert!(board.iter().all(|e| BEST_LAP.contains(e.best_lap)));
    }

    #[test]
    fn comparison_echoes_codes() {
        let mut rng = StdRng::seed_from_u64(5);
        let result = comparison(&mut rng, "monaco_2024_q3", "HAM", "ZZZ");

        assert_eq!(result.session_id, "monaco_2024_q3");
        assert_eq!(result.driver1.id, "HAM");
        assert_eq!(result.driver2.id, "ZZZ");
        assert!(TOP_SPEED.contains(result.driver1.top_speed));
        assert!(CONSISTENCY.contains(result.driver2.consistency));
    }
}
