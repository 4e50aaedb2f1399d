//! # wardbot-core
//!
//! Integer-only Q-learning for a line-following rounds robot on a fixed
//! hospital course.
//!
//! ---
//!
//! The robot follows a painted guide line through ten zones (start, corridors,
//! two patient rooms, nurse station, pharmacy, radiology, return). Every tick it
//! discretises five reflectance readings into a lateral [`LineState`], locates
//! itself by cumulative wheel travel into a [`Segment`], and picks one of five
//! steering [`Action`]s from an 80 × 5 table of `i8` Q-values. Rewards favour
//! staying centred, punish losing the line, and pay a one-off bonus at each of
//! five task waypoints.
//!
//! Learning spans episodes. The operator starts a trial, the controller runs
//! until it times out, completes every task, or loses the line, then reports
//! and waits for the operator again. The table, exploration rate and best
//! reward carry over; everything else starts from zero.
//!
//! ## The pipeline
//!
//! ```text
//! LineSensors ─┐
//!              ├─▶ Discretizer ─▶ StateIndex ─▶ EpsilonGreedy ─▶ Drive
//! WheelEncoders┘        │                           ▲
//!                       ▼                           │
//!                 reward + waypoints ─▶ QTable::update
//!                       │
//!                       ▼
//!                TelemetrySink  (TLM|… / RESULT|…)
//! ```
//!
//! ## Module overview
//!
//! | Module | Key types | What it does |
//! |--------|-----------|--------------|
//! | [`fixed`] | [`Frac`] | 8-bit fixed-point fractions, saturation, percentages |
//! | [`line`] | [`LineState`], [`SensorMask`] | Five-channel threshold mask → lateral position |
//! | [`course`] | [`Segment`], [`Odometer`], [`WheelDeltas`] | Distance thresholds → course zone |
//! | [`perception`] | [`Discretizer`], [`Perception`] | One discrete observation per tick, crossing detection |
//! | [`qtable`] | [`QTable`], [`StateIndex`], [`Action`] | Dense `i8` table, greedy lookup, TD update |
//! | [`policy`] | [`EpsilonGreedy`], [`ExplorationRate`] | Epsilon-greedy selection with geometric decay |
//! | [`reward`] | [`tick_reward`] | Shaped per-tick reward |
//! | [`waypoint`] | [`WaypointTracker`] | Five one-shot tasks and their bonus |
//! | [`episode`] | [`Episode`], [`EpisodeSummary`] | Per-trial counters and termination predicates |
//! | [`agent`] | [`LearningAgent`] | State that survives episode resets |
//! | [`telemetry`] | [`TelemetryFrame`] | Overlay status line |
//! | [`controller`] | [`EpisodeController`] | AwaitingStart → Running → Finalizing loop |
//! | [`platform`] | [`Platform`], [`Cue`] | Hardware collaborator traits |
//! | [`config`] | [`RobotConfig`] | Tunables with defaults and validation |
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use rand::{rngs::SmallRng, SeedableRng};
//! use wardbot_core::{EpisodeController, LearningAgent, RobotConfig};
//!
//! let config = RobotConfig::default();
//! config.validate()?;
//! let mut agent = LearningAgent::new(&config.learning, SmallRng::seed_from_u64(seed));
//! let mut controller = EpisodeController::new(&config);
//! controller.run(&mut agent, &mut board); // never returns
//! ```
//!
//! ## `no_std`
//!
//! This crate is `#![no_std]` by default with no heap and no floating point.
//! Enable the `std` feature for `std::error::Error` on [`ConfigError`]. Enable
//! the `serde` feature for serialisation of configuration and summaries.
//!
//! ## License
//!
//! Business Source License 1.1.

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![deny(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod fixed;
pub mod line;
pub mod course;
pub mod perception;
pub mod qtable;
pub mod policy;
pub mod reward;
pub mod waypoint;
pub mod episode;
pub mod agent;
pub mod telemetry;
pub mod platform;
pub mod controller;
pub mod config;

// ─── Top-level re-exports ─────────────────────────────────────────────────────

pub use agent::{LearningAgent, BEST_REWARD_UNSET};
pub use config::{ConfigError, ControllerConfig, LearningConfig, PerceptionConfig, RobotConfig};
pub use controller::{ControllerPhase, EpisodeController};
pub use course::{Odometer, Segment, WheelDeltas};
pub use episode::{Episode, EpisodeSummary, TerminationReason};
pub use fixed::Frac;
pub use line::{LineState, SensorMask};
pub use perception::{Discretizer, Perception};
pub use platform::{
    Clock, Cue, Drive, LineSensors, Notifier, OperatorInput, Platform, TelemetrySink,
    WheelEncoders,
};
pub use policy::{Choice, EpsilonGreedy, ExplorationRate};
pub use qtable::{Action, QTable, QValue, StateIndex};
pub use reward::tick_reward;
pub use telemetry::TelemetryFrame;
pub use waypoint::{Waypoint, WaypointTracker};
