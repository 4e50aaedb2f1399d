//! End-to-end episodes against a scripted robot.
//!
//! The scripted platform ignores wheel commands: sensors and encoders replay
//! a fixed script, so outcomes depend only on the script and the
//! configuration, never on which actions the policy happens to pick.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use wardbot_core::{
    Clock, Cue, Drive, EpisodeController, Frac, LearningAgent, LearningConfig, LineSensors,
    Notifier, OperatorInput, RobotConfig, Segment, TelemetrySink, TerminationReason,
    WheelDeltas, WheelEncoders, BEST_REWARD_UNSET,
};

const CENTER: [u16; 5] = [0, 0, 900, 0, 0];
const LOST: [u16; 5] = [0; 5];
const DARK: [u16; 5] = [900; 5];

/// Sensor readings and per-tick wheel travel for one episode.
struct Script {
    lines: Vec<[u16; 5]>,
    step: i16,
}

impl Script {
    fn new(lines: Vec<[u16; 5]>, step: i16) -> Self {
        Self { lines, step }
    }
}

/// Plays one [`Script`] per operator signal; the last line of a script repeats.
struct ScriptedBot {
    scripts: Vec<Script>,
    current: usize,
    cursor: usize,
    now: u32,
    signals: usize,
    cues: Vec<Cue>,
    lines: Vec<String>,
    stopped: bool,
}

impl ScriptedBot {
    fn new(scripts: Vec<Script>) -> Self {
        Self {
            scripts,
            current: 0,
            cursor: 0,
            now: 0,
            signals: 0,
            cues: Vec::new(),
            lines: Vec::new(),
            stopped: false,
        }
    }

    fn script(&self) -> &Script {
        &self.scripts[self.current]
    }

    fn results(&self) -> Vec<&str> {
        self.lines
            .iter()
            .filter(|l| l.starts_with("RESULT|"))
            .map(|l| l.as_str())
            .collect()
    }
}

impl LineSensors for ScriptedBot {
    fn read_line(&mut self) -> [u16; 5] {
        let lines = &self.scripts[self.current].lines;
        let reading = lines[self.cursor.min(lines.len() - 1)];
        self.cursor += 1;
        reading
    }
}

impl WheelEncoders for ScriptedBot {
    fn take_deltas(&mut self) -> WheelDeltas {
        let step = self.script().step;
        WheelDeltas::new(step, step)
    }
}

impl Drive for ScriptedBot {
    fn set_speeds(&mut self, left: i8, right: i8) {
        self.stopped = left == 0 && right == 0;
    }
}

impl Notifier for ScriptedBot {
    fn notify(&mut self, cue: Cue) {
        self.cues.push(cue);
    }
}

impl OperatorInput for ScriptedBot {
    fn await_signal(&mut self) {
        self.signals += 1;
        // First signal starts script 0; each "continue" moves to the next.
        self.current = (self.signals - 1).min(self.scripts.len() - 1);
        self.cursor = 0;
    }
}

impl Clock for ScriptedBot {
    fn now_ms(&mut self) -> u32 {
        self.now
    }
    fn delay_ms(&mut self, ms: u32) {
        self.now += ms;
    }
}

impl TelemetrySink for ScriptedBot {
    fn write_line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }
}

fn greedy() -> LearningConfig {
    LearningConfig {
        epsilon_initial: Frac::ZERO,
        epsilon_min: Frac::ZERO,
        ..LearningConfig::default()
    }
}

fn lost_script() -> Script {
    let mut lines = vec![CENTER, CENTER];
    lines.extend(std::iter::repeat(LOST).take(101));
    Script::new(lines, 0)
}

#[test]
fn test_lost_after_101_consecutive_lost_ticks() {
    let config = RobotConfig::default();
    let mut agent = LearningAgent::new(&config.learning, SmallRng::seed_from_u64(1));
    let mut controller = EpisodeController::new(&config);
    let mut bot = ScriptedBot::new(vec![lost_script()]);

    let s = controller
        .run_session(&mut agent, &mut bot, 1)
        .expect("one episode");

    assert_eq!(s.reason, TerminationReason::Lost);
    assert_eq!(s.tasks_complete, 0);
    assert_eq!(s.ticks, 103);
    assert_eq!(s.segment, Segment::START);
    // 2 × (3 - 1) + 101 × (-10 - 1)
    assert_eq!(s.reward, -1_107);
    assert!(s.new_best);
    assert!(bot.stopped);
    assert_eq!(bot.results(), ["RESULT|EP:1|END:lost|RWD:-1107|BEST:-1107|TASKS:0/5|LFA:1|CROSS:0|TICKS:103"]);
}

#[test]
fn test_complete_course() {
    let config = RobotConfig {
        learning: greedy(),
        ..RobotConfig::default()
    };
    let mut agent = LearningAgent::new(&config.learning, SmallRng::seed_from_u64(2));
    let mut controller = EpisodeController::new(&config);
    let mut bot = ScriptedBot::new(vec![Script::new(vec![CENTER], 50)]);

    let s = controller
        .run_session(&mut agent, &mut bot, 1)
        .expect("one episode");

    assert_eq!(s.reason, TerminationReason::Complete);
    assert_eq!(s.tasks_complete, 5);
    assert_eq!(s.task_rate_percent, 100);
    assert_eq!(s.accuracy_percent, 100);
    assert_eq!(s.segment, Segment::RETURN);
    // 50 counts per tick reaches the 11 800 threshold on tick 236.
    assert_eq!(s.ticks, 236);
    // 208 ticks at +2, 28 nurse-station ticks at +7, five waypoints at +30.
    assert_eq!(s.reward, 762);

    let reached: Vec<u8> = bot
        .cues
        .iter()
        .filter_map(|c| match c {
            Cue::WaypointReached(id) => Some(*id),
            _ => None,
        })
        .collect();
    assert_eq!(reached, [0, 1, 2, 3, 4]);

    let final_tlm = bot
        .lines
        .iter()
        .rev()
        .find(|l| l.starts_with("TLM|"))
        .expect("final telemetry line");
    assert_eq!(final_tlm, "TLM|LOC:RETURN|TCR:100|LFA:100|RWD:762/762|EPS:0|TASKS:5/5");
}

#[test]
fn test_timeout_with_short_budget() {
    let mut config = RobotConfig::default();
    config.controller.episode_budget_ms = 1_000;
    let mut agent = LearningAgent::new(&config.learning, SmallRng::seed_from_u64(3));
    let mut controller = EpisodeController::new(&config);
    let mut bot = ScriptedBot::new(vec![Script::new(vec![CENTER], 0)]);

    let s = controller
        .run_session(&mut agent, &mut bot, 1)
        .expect("one episode");

    assert_eq!(s.reason, TerminationReason::Timeout);
    // Ticks at 0, 20, …, 1020 ms; elapsed first exceeds 1000 at 1020.
    assert_eq!(s.ticks, 52);
    assert_eq!(s.tasks_complete, 0);
}

#[test]
fn test_crossings_counted_once_per_entry_after_warmup() {
    let mut config = RobotConfig::default();
    config.controller.episode_budget_ms = 3_000;
    let mut agent = LearningAgent::new(&config.learning, SmallRng::seed_from_u64(4));
    let mut controller = EpisodeController::new(&config);

    let mut lines = Vec::new();
    lines.extend(std::iter::repeat(DARK).take(5)); // inside warm-up
    lines.extend(std::iter::repeat(CENTER).take(95));
    lines.extend(std::iter::repeat(DARK).take(5)); // 2000 ms
    lines.extend(std::iter::repeat(CENTER).take(5));
    lines.extend(std::iter::repeat(DARK).take(5)); // 2200 ms
    lines.push(CENTER);
    let mut bot = ScriptedBot::new(vec![Script::new(lines, 0)]);

    let s = controller
        .run_session(&mut agent, &mut bot, 1)
        .expect("one episode");

    assert_eq!(s.reason, TerminationReason::Timeout);
    assert_eq!(s.crossings, 2);
    // The crossing pattern reads as centred.
    assert_eq!(s.accuracy_percent, 100);
    assert_eq!(bot.cues.iter().filter(|c| **c == Cue::Crossing).count(), 2);
}

#[test]
fn test_reset_keeps_learning_and_clears_episode() {
    let config = RobotConfig::default();
    let mut agent = LearningAgent::new(&config.learning, SmallRng::seed_from_u64(5));
    let mut controller = EpisodeController::new(&config);
    let mut bot = ScriptedBot::new(vec![
        Script::new(vec![CENTER], 50),
        Script::new(vec![LOST], 0),
    ]);
    assert_eq!(agent.best_reward(), BEST_REWARD_UNSET);

    let last = controller
        .run_session(&mut agent, &mut bot, 2)
        .expect("two episodes");

    let results = bot.results();
    assert_eq!(results.len(), 2);
    assert!(results[0].starts_with("RESULT|EP:1|END:complete|RWD:762|BEST:762"), "{}", results[0]);

    assert_eq!(last.episode, 2);
    assert_eq!(last.reason, TerminationReason::Lost);
    assert!(!last.new_best);
    assert_eq!(last.best_reward, 762);

    // Episode-scoped state starts over.
    let ep = controller.episode();
    assert_eq!(ep.tasks_complete(), 0);
    assert_eq!(ep.waypoints().flags(), 0);
    assert_eq!(ep.crossings(), 0);
    assert_eq!(ep.centered(), 0);
    assert_eq!(ep.readings(), 101);
    assert_eq!(ep.segment(), Segment::START);
    assert_eq!(ep.distance(), 0);

    // Run-scoped state carries over.
    assert!(agent.table().visited_entries() > 0);
    assert_eq!(agent.best_reward(), 762);
    assert_eq!(agent.episodes_finished(), 2);
    assert_eq!(agent.exploration().get(), Frac(62));
    assert_eq!(bot.signals, 3);
}
