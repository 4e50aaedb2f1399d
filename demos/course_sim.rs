//! # Ward Rounds Simulation
//!
//! Runs the full episode controller against a simulated robot on the hospital
//! course. No hardware required: the line position, sensor readings and wheel
//! encoders are generated from a tiny integer kinematic model.
//!
//! The simulated line drifts differently in each zone (gentle bends in the
//! corridors, sharper turns into the rooms), so a fixed "always forward" policy
//! loses the line quickly. Watch the exploration rate fall and the accuracy and
//! task count climb as the table fills in.
//!
//! ## Running this demo
//!
//! ```text
//! cargo run --example course_sim -- [episodes] [seed]
//! RUST_LOG=wardbot_core=debug cargo run --example course_sim
//! ```

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use wardbot_core::{
    Clock, Cue, Drive, EpisodeController, EpisodeSummary, LearningAgent, LineSensors,
    Notifier, OperatorInput, RobotConfig, TelemetrySink, WheelDeltas, WheelEncoders,
};

// ── Simulated course ──────────────────────────────────────────────────────────

/// Lateral drift of the line per tick in each segment, in sensor-pitch tenths.
const SEGMENT_CURVE: [i32; 10] = [0, 1, -3, 1, 3, 0, -2, 1, -1, 0];

/// Spacing between adjacent sensors in offset units.
const SENSOR_PITCH: i32 = 10;

/// Offset beyond which the line is behind the robot and cannot be reacquired
/// without a hard turn.
const OFFSET_LIMIT: i32 = 60;

/// Kinematic stand-in for the robot and its course.
struct SimBot {
    /// Line position relative to the sensor array centre; positive is right.
    offset: i32,
    speeds: (i8, i8),
    distance: u32,
    now: u32,
    noise: SmallRng,
}

impl SimBot {
    fn new(seed: u64) -> Self {
        Self {
            offset: 0,
            speeds: (0, 0),
            distance: 0,
            now: 0,
            noise: SmallRng::seed_from_u64(seed ^ 0x5eed),
        }
    }

    fn segment_curve(&self) -> i32 {
        let idx = wardbot_core::Segment::for_distance(self.distance).index() as usize;
        SEGMENT_CURVE[idx]
    }

    fn step(&mut self) {
        let (l, r) = self.speeds;
        // Turning left (right wheel faster) swings the line to the right.
        let turn = (r as i32 - l as i32) / 5;
        let jitter = self.noise.gen_range(-1..=1);
        self.offset = (self.offset + turn + self.segment_curve() + jitter)
            .clamp(-OFFSET_LIMIT, OFFSET_LIMIT);
    }
}

impl LineSensors for SimBot {
    fn read_line(&mut self) -> [u16; 5] {
        let mut out = [0u16; 5];
        for (i, v) in out.iter_mut().enumerate() {
            let pos = (i as i32 - 2) * SENSOR_PITCH;
            let d = (self.offset - pos).abs();
            *v = (1000 - d * 90).clamp(0, 1000) as u16;
        }
        out
    }
}

impl WheelEncoders for SimBot {
    fn take_deltas(&mut self) -> WheelDeltas {
        let (l, r) = self.speeds;
        let deltas = WheelDeltas::new(l as i16, r as i16);
        self.distance = self.distance.saturating_add(deltas.travel());
        deltas
    }
}

impl Drive for SimBot {
    fn set_speeds(&mut self, left: i8, right: i8) {
        self.speeds = (left, right);
    }
}

impl Notifier for SimBot {
    fn notify(&mut self, cue: Cue) {
        log::debug!("cue: {:?}", cue);
    }
}

impl OperatorInput for SimBot {
    fn await_signal(&mut self) {
        // The operator puts the robot back on the start line.
        self.offset = self.noise.gen_range(-4..=4);
        self.distance = 0;
        self.speeds = (0, 0);
    }
}

impl Clock for SimBot {
    fn now_ms(&mut self) -> u32 {
        self.now
    }
    fn delay_ms(&mut self, ms: u32) {
        self.step();
        self.now = self.now.wrapping_add(ms);
    }
}

impl TelemetrySink for SimBot {
    fn write_line(&mut self, line: &str) {
        log::info!("{}", line);
    }
}

// ── Display helpers ───────────────────────────────────────────────────────────

fn bar(pct: u8) -> String {
    let filled = pct as usize / 5;
    format!("[{}{}] {:>3}%", "█".repeat(filled), "░".repeat(20 - filled), pct)
}

fn row(s: &EpisodeSummary) {
    println!(
        "  ep {:>3} {:<8} reward {:>6} best {:>6} | tasks {}/5 | LFA {} | eps {:>2}%",
        s.episode,
        s.reason.as_str(),
        s.reward,
        s.best_reward,
        s.tasks_complete,
        bar(s.accuracy_percent),
        s.exploration_percent,
    );
}

// ── Main ──────────────────────────────────────────────────────────────────────

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut args = std::env::args().skip(1);
    let episodes: u32 = args.next().and_then(|a| a.parse().ok()).unwrap_or(25);
    let seed: u64 = args.next().and_then(|a| a.parse().ok()).unwrap_or(7);

    let config = RobotConfig::default();
    if let Err(e) = config.validate() {
        eprintln!("invalid configuration: {}", e);
        std::process::exit(2);
    }

    println!("╔══════════════════════════════════════════════════════════════════════╗");
    println!("║  Ward rounds: Q-learning line follower, {:>3} episodes, seed {:<6}    ║", episodes, seed);
    println!("╚══════════════════════════════════════════════════════════════════════╝\n");

    let mut agent = LearningAgent::new(&config.learning, SmallRng::seed_from_u64(seed));
    let mut controller = EpisodeController::new(&config);
    let mut bot = SimBot::new(seed);

    bot.await_signal();
    for _ in 0..episodes {
        let summary = controller.run_episode(&mut agent, &mut bot);
        row(&summary);
    }

    println!();
    println!(
        "  best reward {} after {} episodes, {} table entries learned",
        agent.best_reward(),
        agent.episodes_finished(),
        agent.table().visited_entries(),
    );
}
