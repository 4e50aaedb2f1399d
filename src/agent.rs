/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! The learning agent: everything that persists across episodes of one run.
//!
//! # Invariants
//!
//! - The Q-table and best reward survive episode resets; they are lost only
//!   when the agent is dropped (power cycle).
//! - Exploration decays once per finished episode and never below its floor.
//! - Best reward is monotonically non-decreasing.

use rand::RngCore;

use crate::config::LearningConfig;
use crate::policy::{Choice, EpsilonGreedy, ExplorationRate};
use crate::qtable::{Action, QTable, QValue, StateIndex, TdRates};

/// Sentinel best reward before any episode has finished.
pub const BEST_REWARD_UNSET: i32 = -32_768;

/// Q-table, exploration schedule and run-wide statistics.
///
/// Generic over the random source used for exploration so tests and hosts
/// can supply a seeded generator.
pub struct LearningAgent<R: RngCore> {
    table: QTable,
    policy: EpsilonGreedy,
    rates: TdRates,
    rng: R,
    best_reward: i32,
    episodes_finished: u32,
}

impl<R: RngCore> LearningAgent<R> {
    /// A fresh agent with an all-zero table.
    pub fn new(config: &LearningConfig, rng: R) -> Self {
        Self {
            table: QTable::new(),
            policy: EpsilonGreedy::new(ExplorationRate::new(
                config.epsilon_initial,
                config.epsilon_min,
                config.epsilon_decay,
            )),
            rates: TdRates {
                alpha: config.alpha,
                gamma: config.gamma,
            },
            rng,
            best_reward: BEST_REWARD_UNSET,
            episodes_finished: 0,
        }
    }

    /// Choose an action for `state` (epsilon-greedy).
    pub fn act(&mut self, state: StateIndex) -> Choice {
        self.policy.select(&self.table, state, &mut self.rng)
    }

    /// Update the value of `(state, action)` given the reward observed on
    /// arrival in `next`. Returns the new value.
    pub fn learn(&mut self, state: StateIndex, action: Action, reward: i32, next: StateIndex) -> QValue {
        let q = self.table.update(state, action, reward, next, self.rates);
        log::trace!(
            "q[{}][{:?}] <- {} (r={}, next={})",
            state.get(),
            action,
            q,
            reward,
            next.get()
        );
        q
    }

    /// Close out an episode: decay exploration and raise the best-reward mark.
    ///
    /// Returns `true` if `episode_reward` is a new best.
    pub fn finish_episode(&mut self, episode_reward: i32) -> bool {
        self.episodes_finished = self.episodes_finished.saturating_add(1);
        self.policy.epsilon.decay();
        if episode_reward > self.best_reward {
            self.best_reward = episode_reward;
            true
        } else {
            false
        }
    }

    /// The learned table.
    pub fn table(&self) -> &QTable {
        &self.table
    }

    /// Mutable access to the table, for seeding or inspection.
    pub fn table_mut(&mut self) -> &mut QTable {
        &mut self.table
    }

    /// Current exploration schedule.
    pub fn exploration(&self) -> &ExplorationRate {
        &self.policy.epsilon
    }

    /// Best episode reward so far, or [`BEST_REWARD_UNSET`].
    pub fn best_reward(&self) -> i32 {
        self.best_reward
    }

    /// Episodes finalised so far.
    pub fn episodes_finished(&self) -> u32 {
        self.episodes_finished
    }
}

impl<R: RngCore> core::fmt::Debug for LearningAgent<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LearningAgent")
            .field("table", &self.table)
            .field("epsilon", &self.policy.epsilon.get())
            .field("best_reward", &self.best_reward)
            .field("episodes_finished", &self.episodes_finished)
            .finish()
    }
}
