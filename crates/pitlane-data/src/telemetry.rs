//! Synthetic telemetry generation.
//!
//! [`TelemetryGenerator`] produces both the per-tick [`TelemetryFrame`]s
//! pushed over the live socket and the historical sample traces served by
//! `GET /api/telemetry`. All value ranges come from [`TelemetryRanges`],
//! which is loaded from configuration rather than hard-coded.

use chrono::Utc;
use pitlane_types::{Driver, DriverSample, Position, TelemetryFrame, TelemetrySample};
use rand::Rng;
use rand::distr::uniform::SampleUniform;
use serde::Deserialize;

use crate::config::ConfigError;

/// Samples returned by one historical telemetry request.
pub const HISTORY_SAMPLES: u32 = 100;

/// Seconds between consecutive historical samples.
const HISTORY_SPACING_SECS: f64 = 0.1;

/// Every Nth historical sample carries a completed lap time.
const LAP_TIME_EVERY: u32 = 20;

/// Historical samples per sector before advancing to the next one.
const SAMPLES_PER_SECTOR: u32 = 20;

/// An inclusive `[min, max]` range used for uniform sampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ValueRange<T> {
    /// Lower bound (inclusive).
    pub min: T,
    /// Upper bound (inclusive).
    pub max: T,
}

impl<T> ValueRange<T> {
    /// Create a range from its bounds.
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

impl<T: SampleUniform + PartialOrd + Copy> ValueRange<T> {
    /// Whether `value` lies within the range.
    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }

    /// Whether `min <= max`.
    pub fn is_ordered(&self) -> bool {
        self.min <= self.max
    }

    /// Draw a uniformly distributed value. A degenerate or inverted range
    /// yields `min`.
    pub fn sample<R: Rng>(&self, rng: &mut R) -> T {
        if self.min < self.max {
            rng.random_range(self.min..=self.max)
        } else {
            self.min
        }
    }
}

/// Value ranges for generated live telemetry.
///
/// Mirrors the `telemetry` section of `pitlane-config.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TelemetryRanges {
    /// Latitude positions are jittered around.
    pub origin_lat: f64,
    /// Longitude positions are jittered around.
    pub origin_lng: f64,
    /// Maximum absolute jitter applied to each coordinate, in degrees.
    pub position_jitter: f64,
    /// Speed in km/h.
    pub speed: ValueRange<f64>,
    /// Throttle in percent.
    pub throttle: ValueRange<f64>,
    /// Brake in percent.
    pub brake: ValueRange<f64>,
    /// Lap number.
    pub lap: ValueRange<u32>,
    /// Sector number.
    pub sector: ValueRange<u8>,
}

impl Default for TelemetryRanges {
    fn default() -> Self {
        Self {
            origin_lat: 43.7347,
            origin_lng: 7.4206,
            position_jitter: 0.01,
            speed: ValueRange::new(50.0, 300.0),
            throttle: ValueRange::new(0.0, 100.0),
            brake: ValueRange::new(0.0, 100.0),
            lap: ValueRange::new(1, crate::tables::LAP_COUNT),
            sector: ValueRange::new(1, 3),
        }
    }
}

impl TelemetryRanges {
    /// Check that the origin is finite, every range is ordered, and the
    /// sector stays within 1-3.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidRange`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |field: &'static str, reason: &str| ConfigError::InvalidRange {
            field,
            reason: reason.to_owned(),
        };

        if !self.origin_lat.is_finite() {
            return Err(invalid("origin_lat", "must be a finite number"));
        }
        if !self.origin_lng.is_finite() {
            return Err(invalid("origin_lng", "must be a finite number"));
        }
        if !(self.position_jitter >= 0.0 && self.position_jitter.is_finite()) {
            return Err(invalid("position_jitter", "must be a finite non-negative number"));
        }
        if !self.speed.is_ordered() {
            return Err(invalid("speed", "min exceeds max"));
        }
        if !self.throttle.is_ordered() {
            return Err(invalid("throttle", "min exceeds max"));
        }
        if !self.brake.is_ordered() {
            return Err(invalid("brake", "min exceeds max"));
        }
        if !self.lap.is_ordered() || self.lap.min == 0 {
            return Err(invalid("lap", "must be an ordered range starting at 1 or later"));
        }
        if !self.sector.is_ordered() || self.sector.min < 1 || self.sector.max > 3 {
            return Err(invalid("sector", "must be an ordered range within 1-3"));
        }
        Ok(())
    }

    /// Range of valid latitudes after jitter.
    pub const fn lat_range(&self) -> ValueRange<f64> {
        ValueRange::new(
            self.origin_lat - self.position_jitter,
            self.origin_lat + self.position_jitter,
        )
    }

    /// Range of valid longitudes after jitter.
    pub const fn lng_range(&self) -> ValueRange<f64> {
        ValueRange::new(
            self.origin_lng - self.position_jitter,
            self.origin_lng + self.position_jitter,
        )
    }
}

/// Generates randomized telemetry within a fixed set of ranges.
#[derive(Debug, Clone, Default)]
pub struct TelemetryGenerator {
    ranges: TelemetryRanges,
}

impl TelemetryGenerator {
    /// Create a generator over the given ranges.
    pub const fn new(ranges: TelemetryRanges) -> Self {
        Self { ranges }
    }

    /// The ranges this generator draws from.
    pub const fn ranges(&self) -> &TelemetryRanges {
        &self.ranges
    }

    /// A position jittered around the configured origin.
    pub fn position<R: Rng>(&self, rng: &mut R) -> Position {
        Position {
            lat: self.ranges.lat_range().sample(rng),
            lng: self.ranges.lng_range().sample(rng),
        }
    }

    /// One driver's state for a live frame.
    pub fn driver_sample<R: Rng>(&self, rng: &mut R, driver_id: &str) -> DriverSample {
        DriverSample {
            driver_id: driver_id.to_owned(),
            position: self.position(rng),
            speed: self.ranges.speed.sample(rng),
            throttle: self.ranges.throttle.sample(rng),
            brake: self.ranges.brake.sample(rng),
            lap: self.ranges.lap.sample(rng),
            sector: self.ranges.sector.sample(rng),
        }
    }

    /// A full live frame: one sample per driver in table order, stamped
    /// with the current wall-clock time.
    pub fn frame<R: Rng>(
        &self,
        rng: &mut R,
        session_id: &str,
        drivers: &[Driver],
    ) -> TelemetryFrame {
        TelemetryFrame {
            session_id: session_id.to_owned(),
            timestamp: Utc::now(),
            drivers: drivers
                .iter()
                .map(|d| self.driver_sample(rng, &d.id))
                .collect(),
        }
    }

    /// A historical trace of [`HISTORY_SAMPLES`] samples for one driver,
    /// spaced 0.1 s apart starting at `start` (unix seconds).
    ///
    /// Sectors advance every 20 samples and a lap time is attached to every
    /// 20th sample. `lap`, when given, is echoed on each sample.
    pub fn history<R: Rng>(
        &self,
        rng: &mut R,
        driver_id: &str,
        lap: Option<u32>,
        start: f64,
    ) -> Vec<TelemetrySample> {
        let steering = ValueRange::new(-1.0_f64, 1.0);
        let gear = ValueRange::new(1_u8, 8);
        let rpm = ValueRange::new(8_000_u32, 12_000);
        let lap_time = ValueRange::new(70.0_f64, 85.0);

        (0..HISTORY_SAMPLES)
            .map(|i| {
                let sector = u8::try_from((i % 60) / SAMPLES_PER_SECTOR)
                    .unwrap_or(0)
                    .saturating_add(1);
                TelemetrySample {
                    driver_id: driver_id.to_owned(),
                    timestamp: f64::from(i).mul_add(HISTORY_SPACING_SECS, start),
                    position: self.position(rng),
                    speed: self.ranges.speed.sample(rng),
                    throttle: self.ranges.throttle.sample(rng),
                    brake: self.ranges.brake.sample(rng),
                    steering: steering.sample(rng),
                    gear: gear.sample(rng),
                    rpm: rpm.sample(rng),
                    lap_time: (i % LAP_TIME_EVERY == 0).then(|| lap_time.sample(rng)),
                    sector,
                    lap,
                }
            })
            .collect()
    }
}
