//! Discretizer: raw sensor and encoder input → one discrete observation per tick.

use crate::config::PerceptionConfig;
use crate::course::{Odometer, Segment, WheelDeltas};
use crate::line::{LineState, SensorMask, SENSOR_COUNT};

/// One tick's discretised view of the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Perception {
    /// Lateral position relative to the guide line.
    pub line: LineState,
    /// Course segment implied by cumulative travel.
    pub segment: Segment,
    /// Set when this tick moved the robot into a new segment.
    pub entered: Option<Segment>,
    /// Set when this tick started a counted line crossing.
    pub crossing: bool,
}

/// Stateful discretizer, reset at the start of every episode.
///
/// Owns the odometer and the crossing edge detector. Never fails: every
/// input produces a valid [`Perception`].
#[derive(Clone, Debug)]
pub struct Discretizer {
    activation: u16,
    crossing_warmup_ms: u32,
    odometer: Odometer,
    over_crossing: bool,
}

impl Discretizer {
    /// Build a discretizer from perception settings.
    pub fn new(config: &PerceptionConfig) -> Self {
        Self {
            activation: config.activation_threshold,
            crossing_warmup_ms: config.crossing_warmup_ms,
            odometer: Odometer::new(),
            over_crossing: false,
        }
    }

    /// Zero the odometer and clear the crossing latch.
    pub fn reset(&mut self) {
        self.odometer = Odometer::new();
        self.over_crossing = false;
    }

    /// Discretise one tick of input.
    ///
    /// `elapsed_ms` is the time since the episode began. A crossing is counted
    /// only when `elapsed_ms` exceeds the warm-up, and only on the tick that
    /// enters the all-sensors-active pattern: a slow crossing that keeps every
    /// sensor dark for many ticks still counts once. Saturated ticks inside
    /// the warm-up are classified as Center but never counted, even after the
    /// warm-up ends while the pattern persists.
    pub fn perceive(
        &mut self,
        readings: &[u16; SENSOR_COUNT],
        deltas: WheelDeltas,
        elapsed_ms: u32,
    ) -> Perception {
        let mask = SensorMask::from_readings(readings, self.activation);
        let line = mask.classify();

        let saturated = mask.is_saturated();
        let crossing = saturated && !self.over_crossing && elapsed_ms > self.crossing_warmup_ms;
        self.over_crossing = saturated;

        let entered = self.odometer.advance(deltas);
        Perception {
            line,
            segment: self.odometer.segment(),
            entered,
            crossing,
        }
    }

    /// Cumulative travel this episode.
    pub fn distance(&self) -> u32 {
        self.odometer.distance()
    }

    /// Current segment.
    pub fn segment(&self) -> Segment {
        self.odometer.segment()
    }
}
