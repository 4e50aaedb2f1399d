/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Episode controller: the three-state loop that gates trials on the operator.
//!
//! ```text
//!            begin                    termination
//! AwaitingStart ──────▶ Running ──────────────────▶ Finalizing
//!       ▲                                               │
//!       └────────────── operator "continue" ────────────┘
//! ```
//!
//! One [`tick`](EpisodeController::tick) runs, in order: perception, action
//! selection, actuation, reward, the Q update of the previous (state, action)
//! pair, waypoint check, periodic telemetry and the termination check.
//!
//! # Invariants
//!
//! - Exactly one [`TerminationReason`] is recorded per episode, chosen by the
//!   fixed priority timeout → complete → lost.
//! - Starting an episode rebuilds all per-trial state; the agent's table,
//!   exploration rate and best reward are untouched.
//! - Ticks outside [`ControllerPhase::Running`] are ignored.

use rand::RngCore;

use crate::agent::LearningAgent;
use crate::config::{ControllerConfig, RobotConfig};
use crate::episode::{Episode, EpisodeSummary, TerminationReason};
use crate::perception::Discretizer;
use crate::platform::{Cue, Platform};
use crate::qtable::{Action, StateIndex};
use crate::reward::tick_reward;
use crate::telemetry::{emit_line, TelemetryFrame, TelemetrySchedule};

// ─── ControllerPhase ─────────────────────────────────────────────────────────

/// Lifecycle state of the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControllerPhase {
    /// Waiting for the operator to start the next episode.
    AwaitingStart,
    /// Ticking the control loop.
    Running,
    /// A termination predicate fired; the episode must be finalised.
    Finalizing,
}

// ─── EpisodeController ───────────────────────────────────────────────────────

/// Owns per-episode state and drives a [`LearningAgent`] through a [`Platform`].
#[derive(Clone, Debug)]
pub struct EpisodeController {
    timing: ControllerConfig,
    phase: ControllerPhase,
    discretizer: Discretizer,
    episode: Episode,
    episodes_started: u32,
    previous: Option<(StateIndex, Action)>,
    telemetry: TelemetrySchedule,
}

impl EpisodeController {
    /// A controller awaiting its first start signal.
    ///
    /// `config` is assumed to have passed [`RobotConfig::validate`].
    pub fn new(config: &RobotConfig) -> Self {
        Self {
            timing: config.controller,
            phase: ControllerPhase::AwaitingStart,
            discretizer: Discretizer::new(&config.perception),
            episode: Episode::new(0, 0),
            episodes_started: 0,
            previous: None,
            telemetry: TelemetrySchedule::new(config.controller.telemetry_interval_ms, 0),
        }
    }

    /// Current lifecycle state.
    pub fn phase(&self) -> ControllerPhase {
        self.phase
    }

    /// The episode in progress, or the last one finished.
    pub fn episode(&self) -> &Episode {
        &self.episode
    }

    /// Episodes started since construction.
    pub fn episodes_started(&self) -> u32 {
        self.episodes_started
    }

    /// Start a fresh episode: reset per-trial state, discard stale encoder
    /// counts, stamp the start time and enter [`ControllerPhase::Running`].
    pub fn begin<P: Platform>(&mut self, io: &mut P) {
        let _ = io.take_deltas();
        let now = io.now_ms();

        self.episodes_started = self.episodes_started.wrapping_add(1);
        self.episode = Episode::new(self.episodes_started, now);
        self.discretizer.reset();
        self.previous = None;
        self.telemetry = TelemetrySchedule::new(self.timing.telemetry_interval_ms, now);
        self.phase = ControllerPhase::Running;

        log::info!("episode {} started at {} ms", self.episodes_started, now);
        io.notify(Cue::EpisodeStart);
    }

    /// Run one control tick.
    ///
    /// Returns the termination reason on the tick that ends the episode; the
    /// controller is then in [`ControllerPhase::Finalizing`].
    pub fn tick<R: RngCore, P: Platform>(
        &mut self,
        agent: &mut LearningAgent<R>,
        io: &mut P,
    ) -> Option<TerminationReason> {
        if self.phase != ControllerPhase::Running {
            log::warn!("tick ignored in phase {:?}", self.phase);
            return None;
        }

        let now = io.now_ms();
        let readings = io.read_line();
        let deltas = io.take_deltas();
        let seen = self
            .discretizer
            .perceive(&readings, deltas, self.episode.elapsed_ms(now));

        if let Some(segment) = seen.entered {
            log::debug!("entered {} at distance {}", segment, self.discretizer.distance());
            io.notify(Cue::SegmentEntered(segment));
        }
        if seen.crossing {
            log::debug!("line crossing in {}", seen.segment);
            io.notify(Cue::Crossing);
        }

        let state = StateIndex::new(seen.segment, seen.line);
        let action = agent.act(state).action();
        let (left, right) = action.speeds();
        io.set_speeds(left, right);

        let reward = tick_reward(seen.line, seen.segment);
        if let Some((prev_state, prev_action)) = self.previous {
            agent.learn(prev_state, prev_action, reward, state);
        }
        self.previous = Some((state, action));
        self.episode.record(&seen, reward, self.discretizer.distance());

        for wp in self.episode.visit_waypoints() {
            log::info!(
                "episode {}: task {} ({}) complete, {}/5",
                self.episode.number(),
                wp.id,
                wp.name,
                self.episode.tasks_complete()
            );
            io.notify(Cue::WaypointReached(wp.id));
        }

        if self.telemetry.due(now) {
            emit_line(&TelemetryFrame::capture(&self.episode, agent), io);
        }

        let reason = self.episode.termination(
            now,
            self.timing.episode_budget_ms,
            self.timing.lost_tick_limit,
        );
        if reason.is_some() {
            self.phase = ControllerPhase::Finalizing;
        }
        reason
    }

    /// Close the episode: stop the wheels, decay exploration, raise the best
    /// reward, report, then block on the operator before returning to
    /// [`ControllerPhase::AwaitingStart`].
    pub fn finalize<R: RngCore, P: Platform>(
        &mut self,
        reason: TerminationReason,
        agent: &mut LearningAgent<R>,
        io: &mut P,
    ) -> EpisodeSummary {
        io.stop();
        let new_best = agent.finish_episode(self.episode.reward());

        let ep = &self.episode;
        let summary = EpisodeSummary {
            episode: ep.number(),
            reason,
            reward: ep.reward(),
            best_reward: agent.best_reward(),
            new_best,
            tasks_complete: ep.tasks_complete(),
            task_rate_percent: ep.task_rate_percent(),
            accuracy_percent: ep.accuracy_percent(),
            crossings: ep.crossings(),
            ticks: ep.ticks(),
            segment: ep.segment(),
            exploration_percent: agent.exploration().percent(),
        };

        emit_line(&TelemetryFrame::capture(ep, agent), io);
        emit_line(&summary, io);
        log::info!(
            "episode {} ended ({}): reward {} best {} tasks {}/5 accuracy {}% eps {}%",
            summary.episode,
            reason,
            summary.reward,
            summary.best_reward,
            summary.tasks_complete,
            summary.accuracy_percent,
            summary.exploration_percent
        );

        io.notify(Cue::EpisodeEnd(reason));
        if new_best {
            io.notify(Cue::NewBest);
        }

        io.await_signal();
        self.phase = ControllerPhase::AwaitingStart;
        summary
    }

    /// Run one complete episode from start to the operator's continue signal.
    pub fn run_episode<R: RngCore, P: Platform>(
        &mut self,
        agent: &mut LearningAgent<R>,
        io: &mut P,
    ) -> EpisodeSummary {
        self.begin(io);
        loop {
            if let Some(reason) = self.tick(agent, io) {
                return self.finalize(reason, agent, io);
            }
            io.delay_ms(self.timing.tick_ms);
        }
    }

    /// Wait for the operator once, then run `episodes` back to back.
    ///
    /// Returns the last summary, or `None` if `episodes` is zero.
    pub fn run_session<R: RngCore, P: Platform>(
        &mut self,
        agent: &mut LearningAgent<R>,
        io: &mut P,
        episodes: u32,
    ) -> Option<EpisodeSummary> {
        if episodes == 0 {
            return None;
        }
        io.await_signal();
        let mut last = None;
        for _ in 0..episodes {
            last = Some(self.run_episode(agent, io));
        }
        last
    }

    /// The firmware main loop: wait for the operator, then run episodes forever.
    pub fn run<R: RngCore, P: Platform>(&mut self, agent: &mut LearningAgent<R>, io: &mut P) -> ! {
        io.await_signal();
        loop {
            self.run_episode(agent, io);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LearningConfig;
    use crate::course::WheelDeltas;
    use crate::fixed::Frac;
    use crate::line::SENSOR_COUNT;
    use crate::platform::{Clock, Drive, LineSensors, Notifier, OperatorInput, TelemetrySink, WheelEncoders};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::string::String;
    use std::vec::Vec;

    const ON_CENTER: [u16; SENSOR_COUNT] = [0, 0, 900, 0, 0];

    /// Constant sensors, constant wheel travel, clock advanced only by delays.
    struct FakeBot {
        line: [u16; SENSOR_COUNT],
        step: i16,
        now: u32,
        speeds: (i8, i8),
        cues: Vec<Cue>,
        lines: Vec<String>,
        signals: u32,
    }

    impl FakeBot {
        fn new(line: [u16; SENSOR_COUNT], step: i16) -> Self {
            Self {
                line,
                step,
                now: 0,
                speeds: (0, 0),
                cues: Vec::new(),
                lines: Vec::new(),
                signals: 0,
            }
        }
    }

    impl LineSensors for FakeBot {
        fn read_line(&mut self) -> [u16; SENSOR_COUNT] {
            self.line
        }
    }
    impl WheelEncoders for FakeBot {
        fn take_deltas(&mut self) -> WheelDeltas {
            WheelDeltas::new(self.step, self.step)
        }
    }
    impl Drive for FakeBot {
        fn set_speeds(&mut self, left: i8, right: i8) {
            self.speeds = (left, right);
        }
    }
    impl Notifier for FakeBot {
        fn notify(&mut self, cue: Cue) {
            self.cues.push(cue);
        }
    }
    impl OperatorInput for FakeBot {
        fn await_signal(&mut self) {
            self.signals += 1;
        }
    }
    impl Clock for FakeBot {
        fn now_ms(&mut self) -> u32 {
            self.now
        }
        fn delay_ms(&mut self, ms: u32) {
            self.now += ms;
        }
    }
    impl TelemetrySink for FakeBot {
        fn write_line(&mut self, line: &str) {
            self.lines.push(line.into());
        }
    }

    fn greedy_agent() -> LearningAgent<SmallRng> {
        let cfg = LearningConfig {
            epsilon_initial: Frac::ZERO,
            epsilon_min: Frac::ZERO,
            ..LearningConfig::default()
        };
        LearningAgent::new(&cfg, SmallRng::seed_from_u64(5))
    }

    #[test]
    fn test_starts_awaiting() {
        let c = EpisodeController::new(&RobotConfig::default());
        assert_eq!(c.phase(), ControllerPhase::AwaitingStart);
        assert_eq!(c.episodes_started(), 0);
    }

    #[test]
    fn test_tick_before_begin_is_ignored() {
        let mut c = EpisodeController::new(&RobotConfig::default());
        let mut agent = greedy_agent();
        let mut bot = FakeBot::new(ON_CENTER, 10);
        assert_eq!(c.tick(&mut agent, &mut bot), None);
        assert_eq!(c.episode().ticks(), 0);
        assert!(bot.cues.is_empty());
    }

    #[test]
    fn test_begin_enters_running() {
        let mut c = EpisodeController::new(&RobotConfig::default());
        let mut bot = FakeBot::new(ON_CENTER, 0);
        bot.now = 7_000;
        c.begin(&mut bot);
        assert_eq!(c.phase(), ControllerPhase::Running);
        assert_eq!(c.episode().number(), 1);
        assert_eq!(c.episode().started_at_ms(), 7_000);
        assert_eq!(bot.cues, [Cue::EpisodeStart]);
    }

    #[test]
    fn test_first_tick_actuates_without_learning() {
        let mut c = EpisodeController::new(&RobotConfig::default());
        let mut agent = greedy_agent();
        let mut bot = FakeBot::new(ON_CENTER, 0);
        c.begin(&mut bot);
        assert_eq!(c.tick(&mut agent, &mut bot), None);
        // All-zero row: greedy picks Forward.
        assert_eq!(bot.speeds, Action::Forward.speeds());
        assert_eq!(agent.table().visited_entries(), 0);
        assert_eq!(c.episode().reward(), 2);

        bot.delay_ms(20);
        c.tick(&mut agent, &mut bot);
        // Second tick learns from the first: 38 * 2 / 255 == 0, so still unvisited.
        assert_eq!(c.episode().reward(), 4);
        assert_eq!(c.episode().ticks(), 2);
    }

    #[test]
    fn test_segment_and_waypoint_cues() {
        let mut c = EpisodeController::new(&RobotConfig::default());
        let mut agent = greedy_agent();
        let mut bot = FakeBot::new(ON_CENTER, 1_300);
        c.begin(&mut bot);
        c.tick(&mut agent, &mut bot); // 1300 -> CORRIDOR_A
        c.tick(&mut agent, &mut bot); // 2600 -> PATIENT_ROOM_1
        assert!(bot.cues.contains(&Cue::SegmentEntered(crate::course::Segment::new(1))));
        assert!(bot.cues.contains(&Cue::WaypointReached(0)));
        assert_eq!(c.episode().tasks_complete(), 1);
    }

    #[test]
    fn test_finalize_reports_and_returns_to_awaiting() {
        let mut c = EpisodeController::new(&RobotConfig::default());
        let mut agent = greedy_agent();
        let mut bot = FakeBot::new(ON_CENTER, 0);
        c.begin(&mut bot);
        c.tick(&mut agent, &mut bot);
        let summary = c.finalize(TerminationReason::Timeout, &mut agent, &mut bot);

        assert_eq!(c.phase(), ControllerPhase::AwaitingStart);
        assert_eq!(bot.speeds, (0, 0));
        assert_eq!(bot.signals, 1);
        assert!(summary.new_best);
        assert_eq!(summary.best_reward, summary.reward);
        assert_eq!(agent.best_reward(), 2);
        assert!(bot.cues.contains(&Cue::EpisodeEnd(TerminationReason::Timeout)));
        assert_eq!(bot.cues.last(), Some(&Cue::NewBest));

        let n = bot.lines.len();
        assert!(bot.lines[n - 2].starts_with("TLM|"), "{}", bot.lines[n - 2]);
        assert!(bot.lines[n - 1].starts_with("RESULT|EP:1|END:timeout"), "{}", bot.lines[n - 1]);
    }

    #[test]
    fn test_run_session_zero_episodes_does_nothing() {
        let mut c = EpisodeController::new(&RobotConfig::default());
        let mut agent = greedy_agent();
        let mut bot = FakeBot::new(ON_CENTER, 0);
        assert_eq!(c.run_session(&mut agent, &mut bot, 0), None);
        assert_eq!(bot.signals, 0);
    }

    #[test]
    fn test_telemetry_is_periodic() {
        let mut cfg = RobotConfig::default();
        cfg.controller.episode_budget_ms = 3_000;
        let mut c = EpisodeController::new(&cfg);
        let mut agent = greedy_agent();
        let mut bot = FakeBot::new(ON_CENTER, 0);
        let s = c.run_episode(&mut agent, &mut bot);
        assert_eq!(s.reason, TerminationReason::Timeout);
        // Periodic lines at 1000, 2000 and 3000 ms plus the final frame.
        let tlm = bot.lines.iter().filter(|l| l.starts_with("TLM|")).count();
        assert_eq!(tlm, 4);
    }
}
