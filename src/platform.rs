//! Hardware collaborator traits.
//!
//! The controller never touches a register. Each external concern (sensor
//! array, encoders, motors, buzzer/LCD cues, operator button, clock, serial
//! telemetry) is one small trait; a board support crate or a simulator
//! implements all of them on one type and gets [`Platform`] for free.
//!
//! # Implementing for a new board
//!
//! ```rust,ignore
//! struct Board { /* peripherals */ }
//!
//! impl LineSensors for Board {
//!     fn read_line(&mut self) -> [u16; SENSOR_COUNT] { self.qtr.read_calibrated() }
//! }
//! impl WheelEncoders for Board {
//!     fn take_deltas(&mut self) -> WheelDeltas { self.enc.take() }
//! }
//! // ... Drive, Notifier, OperatorInput, Clock, TelemetrySink
//! ```

use crate::course::{Segment, WheelDeltas};
use crate::episode::TerminationReason;
use crate::line::SENSOR_COUNT;

/// Calibrated reflectance array.
pub trait LineSensors {
    /// One reading per channel, nominally 0..=1000 (larger values are clamped).
    fn read_line(&mut self) -> [u16; SENSOR_COUNT];
}

/// Quadrature wheel encoders.
pub trait WheelEncoders {
    /// Counts since the previous call; the hardware counters reset as a side effect.
    fn take_deltas(&mut self) -> WheelDeltas;
}

/// Differential drive.
pub trait Drive {
    /// Set wheel speeds on the symmetric -100..=100 scale.
    fn set_speeds(&mut self, left: i8, right: i8);

    /// Stop both wheels.
    fn stop(&mut self) {
        self.set_speeds(0, 0);
    }
}

/// Semantic events for the buzzer, LEDs or display.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cue {
    /// A new episode is running.
    EpisodeStart,
    /// The robot crossed into a new segment.
    SegmentEntered(Segment),
    /// A task waypoint was completed for the first time this episode.
    WaypointReached(u8),
    /// A line crossing was counted.
    Crossing,
    /// The episode ended.
    EpisodeEnd(TerminationReason),
    /// The episode that just ended set a new best reward.
    NewBest,
}

/// Fire-and-forget notification output.
pub trait Notifier {
    /// Emit a cue. Must not block the control loop.
    fn notify(&mut self, cue: Cue);
}

/// Operator go-ahead (button, serial command).
pub trait OperatorInput {
    /// Block until the operator signals.
    fn await_signal(&mut self);
}

/// Monotonic millisecond clock.
pub trait Clock {
    /// Milliseconds since boot; may wrap.
    fn now_ms(&mut self) -> u32;
    /// Sleep or busy-wait for `ms` milliseconds.
    fn delay_ms(&mut self, ms: u32);
}

/// Line-oriented text output for the overlay consumer.
pub trait TelemetrySink {
    /// Write one complete line, without the trailing newline.
    fn write_line(&mut self, line: &str);
}

/// Everything the episode controller needs from the outside world.
pub trait Platform:
    LineSensors + WheelEncoders + Drive + Notifier + OperatorInput + Clock + TelemetrySink
{
}

impl<T> Platform for T where
    T: LineSensors + WheelEncoders + Drive + Notifier + OperatorInput + Clock + TelemetrySink
{
}
