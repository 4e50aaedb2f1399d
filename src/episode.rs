//! One bounded trial, from start signal to termination.
//!
//! [`Episode`] is a value object: it is rebuilt from scratch at every start,
//! so nothing in it survives into the next trial. The learned table and the
//! best-reward mark live in [`LearningAgent`](crate::agent::LearningAgent).

use crate::course::Segment;
use crate::fixed::ratio_percent;
use crate::line::LineState;
use crate::perception::Perception;
use crate::waypoint::{Hits, WaypointTracker, WAYPOINT_BONUS, WAYPOINT_COUNT};

// ─── TerminationReason ───────────────────────────────────────────────────────

/// Why an episode ended. Exactly one is recorded per episode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TerminationReason {
    /// The episode time budget ran out.
    Timeout,
    /// Every task done and the return segment reached.
    Complete,
    /// The line was lost for too many consecutive ticks.
    Lost,
}

impl TerminationReason {
    /// Short lowercase label used in logs and the summary line.
    pub fn as_str(self) -> &'static str {
        match self {
            TerminationReason::Timeout => "timeout",
            TerminationReason::Complete => "complete",
            TerminationReason::Lost => "lost",
        }
    }
}

impl core::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Episode ─────────────────────────────────────────────────────────────────

/// Per-trial counters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Episode {
    number: u32,
    started_at_ms: u32,
    distance: u32,
    segment: Segment,
    reward: i32,
    waypoints: WaypointTracker,
    crossings: u16,
    centered: u32,
    readings: u32,
    lost_streak: u16,
    ticks: u32,
}

impl Episode {
    /// A zeroed episode numbered `number`, started at `started_at_ms`.
    pub fn new(number: u32, started_at_ms: u32) -> Self {
        Self {
            number,
            started_at_ms,
            distance: 0,
            segment: Segment::START,
            reward: 0,
            waypoints: WaypointTracker::new(),
            crossings: 0,
            centered: 0,
            readings: 0,
            lost_streak: 0,
            ticks: 0,
        }
    }

    /// Fold one tick's perception and reward into the counters.
    ///
    /// Any non-Lost tick resets the lost streak to zero.
    pub fn record(&mut self, p: &Perception, reward: i32, distance: u32) {
        self.ticks = self.ticks.saturating_add(1);
        self.readings = self.readings.saturating_add(1);
        if p.line.is_centered() {
            self.centered = self.centered.saturating_add(1);
        }
        if p.crossing {
            self.crossings = self.crossings.saturating_add(1);
        }
        self.lost_streak = if p.line == LineState::Lost {
            self.lost_streak.saturating_add(1)
        } else {
            0
        };
        self.segment = p.segment;
        self.distance = distance;
        self.reward = self.reward.saturating_add(reward);
    }

    /// Check waypoints for the current segment and credit any first visits.
    pub fn visit_waypoints(&mut self) -> Hits {
        let hits = self.waypoints.visit(self.segment);
        self.reward = self
            .reward
            .saturating_add(WAYPOINT_BONUS * hits.len() as i32);
        hits
    }

    /// Episode number, starting at 1.
    pub fn number(&self) -> u32 {
        self.number
    }

    /// Clock reading when the episode began.
    pub fn started_at_ms(&self) -> u32 {
        self.started_at_ms
    }

    /// Milliseconds since the episode began, tolerant of clock wrap.
    pub fn elapsed_ms(&self, now_ms: u32) -> u32 {
        now_ms.wrapping_sub(self.started_at_ms)
    }

    /// Cumulative travel.
    pub fn distance(&self) -> u32 {
        self.distance
    }

    /// Segment as of the last tick.
    pub fn segment(&self) -> Segment {
        self.segment
    }

    /// Accumulated reward including waypoint bonuses.
    pub fn reward(&self) -> i32 {
        self.reward
    }

    /// Completion set.
    pub fn waypoints(&self) -> &WaypointTracker {
        &self.waypoints
    }

    /// Completed tasks, 0..=5.
    pub fn tasks_complete(&self) -> u8 {
        self.waypoints.completed()
    }

    /// Counted line crossings.
    pub fn crossings(&self) -> u16 {
        self.crossings
    }

    /// Ticks classified as Center.
    pub fn centered(&self) -> u32 {
        self.centered
    }

    /// Ticks observed.
    pub fn readings(&self) -> u32 {
        self.readings
    }

    /// Current run of consecutive Lost ticks.
    pub fn lost_streak(&self) -> u16 {
        self.lost_streak
    }

    /// Control ticks executed.
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Task-completion rate, 20 % per task.
    pub fn task_rate_percent(&self) -> u8 {
        self.waypoints.completion_percent()
    }

    /// Share of ticks spent centred on the line.
    pub fn accuracy_percent(&self) -> u8 {
        ratio_percent(self.centered, self.readings)
    }

    /// Evaluate the termination predicates in priority order:
    /// timeout, then completion, then lost.
    pub fn termination(
        &self,
        now_ms: u32,
        budget_ms: u32,
        lost_tick_limit: u16,
    ) -> Option<TerminationReason> {
        if self.elapsed_ms(now_ms) > budget_ms {
            Some(TerminationReason::Timeout)
        } else if self.waypoints.all_complete() && self.segment >= Segment::RETURN {
            Some(TerminationReason::Complete)
        } else if self.lost_streak > lost_tick_limit {
            Some(TerminationReason::Lost)
        } else {
            None
        }
    }
}

// ─── EpisodeSummary ──────────────────────────────────────────────────────────

/// Metrics reported when an episode is finalised.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EpisodeSummary {
    /// Episode number.
    pub episode: u32,
    /// Why it ended.
    pub reason: TerminationReason,
    /// Total episode reward.
    pub reward: i32,
    /// Best total reward of the run, including this episode.
    pub best_reward: i32,
    /// `true` if this episode set a new best.
    pub new_best: bool,
    /// Tasks completed, 0..=5.
    pub tasks_complete: u8,
    /// Task-completion rate percent.
    pub task_rate_percent: u8,
    /// Line-following accuracy percent.
    pub accuracy_percent: u8,
    /// Counted line crossings.
    pub crossings: u16,
    /// Control ticks executed.
    pub ticks: u32,
    /// Final segment.
    pub segment: Segment,
    /// Exploration rate percent after this episode's decay.
    pub exploration_percent: u8,
}

impl core::fmt::Display for EpisodeSummary {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "RESULT|EP:{}|END:{}|RWD:{}|BEST:{}|TASKS:{}/{}|LFA:{}|CROSS:{}|TICKS:{}",
            self.episode,
            self.reason,
            self.reward,
            self.best_reward,
            self.tasks_complete,
            WAYPOINT_COUNT,
            self.accuracy_percent,
            self.crossings,
            self.ticks,
        )
    }
}
