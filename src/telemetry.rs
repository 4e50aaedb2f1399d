//! Overlay telemetry: a single pipe-delimited status line.
//!
//! ```text
//! TLM|LOC:NURSE_STATION|TCR:60|LFA:87|RWD:142/188|EPS:24|TASKS:3/5
//! ```
//!
//! Field order is fixed; the overlay parser depends on it. Formatting reads
//! a [`TelemetryFrame`] snapshot and never touches control state.

use core::fmt::Write;

use heapless::String;
use rand::RngCore;

use crate::agent::LearningAgent;
use crate::episode::Episode;
use crate::platform::TelemetrySink;
use crate::waypoint::WAYPOINT_COUNT;

/// Marker token that starts every telemetry line.
pub const TELEMETRY_MARKER: &str = "TLM";

/// Capacity of the line buffer. The longest possible line is well under this.
pub const LINE_CAPACITY: usize = 128;

/// Read-only view of the values reported on one line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TelemetryFrame {
    /// Current segment name.
    pub location: &'static str,
    /// Task-completion rate percent.
    pub task_rate_percent: u8,
    /// Line-following accuracy percent.
    pub accuracy_percent: u8,
    /// Episode reward so far.
    pub reward: i32,
    /// Best episode reward of the run.
    pub best_reward: i32,
    /// Exploration rate percent.
    pub exploration_percent: u8,
    /// Tasks completed.
    pub tasks_complete: u8,
}

impl TelemetryFrame {
    /// Snapshot the current episode and agent.
    pub fn capture<R: RngCore>(episode: &Episode, agent: &LearningAgent<R>) -> Self {
        Self {
            location: episode.segment().name(),
            task_rate_percent: episode.task_rate_percent(),
            accuracy_percent: episode.accuracy_percent(),
            reward: episode.reward(),
            best_reward: agent.best_reward(),
            exploration_percent: agent.exploration().percent(),
            tasks_complete: episode.tasks_complete(),
        }
    }
}

impl core::fmt::Display for TelemetryFrame {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}|LOC:{}|TCR:{}|LFA:{}|RWD:{}/{}|EPS:{}|TASKS:{}/{}",
            TELEMETRY_MARKER,
            self.location,
            self.task_rate_percent,
            self.accuracy_percent,
            self.reward,
            self.best_reward,
            self.exploration_percent,
            self.tasks_complete,
            WAYPOINT_COUNT,
        )
    }
}

/// Render any displayable record into a fixed buffer and push it to `sink`.
///
/// Returns `false` (and logs) if the line did not fit; nothing is written
/// in that case.
pub fn emit_line<T: core::fmt::Display, S: TelemetrySink + ?Sized>(record: &T, sink: &mut S) -> bool {
    let mut line: String<LINE_CAPACITY> = String::new();
    if write!(line, "{}", record).is_err() {
        log::warn!("telemetry line exceeded {} bytes, dropped", LINE_CAPACITY);
        return false;
    }
    sink.write_line(&line);
    true
}

/// Decides when the next periodic line is due.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TelemetrySchedule {
    interval_ms: u32,
    last_ms: u32,
}

impl TelemetrySchedule {
    /// A schedule firing every `interval_ms`, counting from `start_ms`.
    pub fn new(interval_ms: u32, start_ms: u32) -> Self {
        Self {
            interval_ms,
            last_ms: start_ms,
        }
    }

    /// `true` (and re-arms) when at least one interval has passed.
    pub fn due(&mut self, now_ms: u32) -> bool {
        if now_ms.wrapping_sub(self.last_ms) >= self.interval_ms {
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }
}
