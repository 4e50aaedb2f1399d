//! Tunable parameters for learning, perception and the control loop.
//!
//! Every field has a working default taken from the reference course. All
//! rates are [`Frac`]s of 255, all durations are milliseconds.
//!
//! Validate once at start-up with [`RobotConfig::validate`]; nothing
//! downstream re-checks.

use crate::fixed::Frac;
use crate::line::SENSOR_MAX;

// ─── LearningConfig ──────────────────────────────────────────────────────────

/// Q-learning and exploration parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LearningConfig {
    /// Step size. Default 38 (≈ 0.15).
    pub alpha: Frac,
    /// Discount factor. Default 242 (≈ 0.95).
    pub gamma: Frac,
    /// Exploration rate for the first episode. Default 77 (≈ 30 %).
    pub epsilon_initial: Frac,
    /// Exploration floor. Default 13 (≈ 5 %).
    pub epsilon_min: Frac,
    /// Per-episode multiplicative decay. Default 230 (≈ 0.9).
    pub epsilon_decay: Frac,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            alpha: Frac(38),
            gamma: Frac(242),
            epsilon_initial: Frac(77),
            epsilon_min: Frac(13),
            epsilon_decay: Frac(230),
        }
    }
}

// ─── PerceptionConfig ────────────────────────────────────────────────────────

/// Sensor thresholding parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerceptionConfig {
    /// Calibrated reading at or above which a channel sees the line.
    /// Range 1..=1000. Default 500.
    pub activation_threshold: u16,
    /// Crossings seen earlier than this after episode start are not counted.
    /// Default 1500 ms.
    pub crossing_warmup_ms: u32,
}

impl Default for PerceptionConfig {
    fn default() -> Self {
        Self {
            activation_threshold: 500,
            crossing_warmup_ms: 1_500,
        }
    }
}

// ─── ControllerConfig ────────────────────────────────────────────────────────

/// Episode timing and termination parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControllerConfig {
    /// Control-loop period. Default 20 ms.
    pub tick_ms: u32,
    /// Episode time budget; exceeding it ends the episode. Default 120 s.
    pub episode_budget_ms: u32,
    /// Consecutive Lost ticks tolerated; one more ends the episode. Default 100.
    pub lost_tick_limit: u16,
    /// Wall-clock spacing of telemetry lines. Default 1000 ms.
    pub telemetry_interval_ms: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tick_ms: 20,
            episode_budget_ms: 120_000,
            lost_tick_limit: 100,
            telemetry_interval_ms: 1_000,
        }
    }
}

// ─── RobotConfig ─────────────────────────────────────────────────────────────

/// Complete configuration for one robot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RobotConfig {
    /// Learning parameters.
    pub learning: LearningConfig,
    /// Perception parameters.
    pub perception: PerceptionConfig,
    /// Control-loop parameters.
    pub controller: ControllerConfig,
}

impl RobotConfig {
    /// Reject parameter combinations the control loop cannot honour.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let l = &self.learning;
        if l.epsilon_min > l.epsilon_initial {
            return Err(ConfigError::EpsilonFloorAboveInitial {
                floor: l.epsilon_min.0,
                initial: l.epsilon_initial.0,
            });
        }

        let p = &self.perception;
        if p.activation_threshold == 0 || p.activation_threshold > SENSOR_MAX {
            return Err(ConfigError::ActivationOutOfRange(p.activation_threshold));
        }

        let c = &self.controller;
        if c.tick_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }
        if c.episode_budget_ms < c.tick_ms {
            return Err(ConfigError::BudgetShorterThanTick {
                budget_ms: c.episode_budget_ms,
                tick_ms: c.tick_ms,
            });
        }
        if c.telemetry_interval_ms < c.tick_ms {
            return Err(ConfigError::TelemetryFasterThanTick {
                interval_ms: c.telemetry_interval_ms,
                tick_ms: c.tick_ms,
            });
        }
        Ok(())
    }
}

// ─── ConfigError ─────────────────────────────────────────────────────────────

/// Why a [`RobotConfig`] was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// The exploration floor exceeds the starting rate.
    EpsilonFloorAboveInitial {
        /// Configured floor.
        floor: u8,
        /// Configured starting rate.
        initial: u8,
    },
    /// Activation threshold outside 1..=1000.
    ActivationOutOfRange(u16),
    /// Tick period of zero.
    ZeroTick,
    /// Episode budget shorter than one tick.
    BudgetShorterThanTick {
        /// Configured budget.
        budget_ms: u32,
        /// Configured tick.
        tick_ms: u32,
    },
    /// Telemetry interval shorter than one tick.
    TelemetryFasterThanTick {
        /// Configured interval.
        interval_ms: u32,
        /// Configured tick.
        tick_ms: u32,
    },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::EpsilonFloorAboveInitial { floor, initial } => write!(
                f,
                "epsilon floor {}/255 is above the initial rate {}/255",
                floor, initial
            ),
            ConfigError::ActivationOutOfRange(v) => {
                write!(f, "activation threshold {} outside 1..={}", v, SENSOR_MAX)
            }
            ConfigError::ZeroTick => f.write_str("tick period must be non-zero"),
            ConfigError::BudgetShorterThanTick { budget_ms, tick_ms } => write!(
                f,
                "episode budget {} ms is shorter than one {} ms tick",
                budget_ms, tick_ms
            ),
            ConfigError::TelemetryFasterThanTick { interval_ms, tick_ms } => write!(
                f,
                "telemetry interval {} ms is shorter than one {} ms tick",
                interval_ms, tick_ms
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(RobotConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_defaults_match_reference_course() {
        let cfg = RobotConfig::default();
        assert_eq!(cfg.learning.alpha, Frac(38));
        assert_eq!(cfg.learning.gamma, Frac(242));
        assert_eq!(cfg.controller.tick_ms, 20);
        assert_eq!(cfg.controller.lost_tick_limit, 100);
        assert_eq!(cfg.perception.activation_threshold, 500);
    }

    #[test]
    fn test_rejects_floor_above_initial() {
        let mut cfg = RobotConfig::default();
        cfg.learning.epsilon_min = Frac(90);
        assert_eq!(
            cfg.validate(),
            Err(ConfigError::EpsilonFloorAboveInitial { floor: 90, initial: 77 })
        );
    }

    #[test]
    fn test_rejects_bad_activation() {
        let mut cfg = RobotConfig::default();
        cfg.perception.activation_threshold = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ActivationOutOfRange(0)));
        cfg.perception.activation_threshold = 1_001;
        assert_eq!(cfg.validate(), Err(ConfigError::ActivationOutOfRange(1_001)));
    }

    #[test]
    fn test_rejects_bad_timing() {
        let mut cfg = RobotConfig::default();
        cfg.controller.tick_ms = 0;
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroTick));

        let mut cfg = RobotConfig::default();
        cfg.controller.episode_budget_ms = 10;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::BudgetShorterThanTick { budget_ms: 10, tick_ms: 20 })
        ));

        let mut cfg = RobotConfig::default();
        cfg.controller.telemetry_interval_ms = 5;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::TelemetryFasterThanTick { .. })
        ));
    }

    #[test]
    fn test_error_display() {
        let msg = ConfigError::ZeroTick.to_string();
        assert_eq!(msg, "tick period must be non-zero");
        let msg = ConfigError::ActivationOutOfRange(0).to_string();
        assert!(msg.contains("1..=1000"), "{}", msg);
    }
}
