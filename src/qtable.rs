/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Dense integer Q-table indexed by (segment, line state) × action.
//!
//! # Update rule
//!
//! One-step Q-learning in 8-bit fixed point:
//!
//! ```text
//! target = reward + gamma · max_a Q[next][a]
//! delta  = target − Q[state][action]
//! Q[state][action] = saturate(Q[state][action] + alpha · delta)
//! ```
//!
//! where `alpha` and `gamma` are [`Frac`]s of 255 and every product is taken
//! in `i32` with truncating division.
//!
//! # Invariants
//!
//! - Every entry stays within [-128, 127] after every update (saturating).
//! - [`QTable::best_action`] breaks ties toward the lowest action id.
//! - [`StateIndex`] is always in 0..80; no lookup can go out of bounds.

use crate::course::{Segment, SEGMENT_COUNT};
use crate::fixed::{saturate_q, Frac};
use crate::line::{LineState, LINE_STATE_COUNT};

/// Fixed-point action value.
pub type QValue = i8;

/// Number of discrete states (segments × line states).
pub const STATE_COUNT: usize = SEGMENT_COUNT * LINE_STATE_COUNT;

/// Number of drive actions.
pub const ACTION_COUNT: usize = 5;

/// Wheel speed pairs `(left, right)` on the -100..100 drive scale, indexed by
/// [`Action`] ordinal.
pub const ACTION_SPEEDS: [(i8, i8); ACTION_COUNT] = [
    (60, 60),
    (35, 60),
    (60, 35),
    (0, 55),
    (55, 0),
];

/// Row key of the Q-table: `segment × 8 + line`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateIndex(u8);

impl StateIndex {
    /// Encode a (segment, line state) pair.
    #[inline]
    pub fn new(segment: Segment, line: LineState) -> Self {
        StateIndex(segment.index() * LINE_STATE_COUNT as u8 + line.index())
    }

    /// Row number in 0..[`STATE_COUNT`].
    #[inline]
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

/// A drive primitive. The ordinal is the Q-table column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Action {
    /// Both wheels at cruise speed.
    Forward = 0,
    /// Gentle left correction.
    SoftLeft = 1,
    /// Gentle right correction.
    SoftRight = 2,
    /// Pivot left on the left wheel.
    HardLeft = 3,
    /// Pivot right on the right wheel.
    HardRight = 4,
}

impl Action {
    /// All actions in ordinal order.
    pub const ALL: [Action; ACTION_COUNT] = [
        Action::Forward,
        Action::SoftLeft,
        Action::SoftRight,
        Action::HardLeft,
        Action::HardRight,
    ];

    /// Action for a column index; indices past the end wrap.
    #[inline]
    pub fn from_index(index: usize) -> Self {
        Self::ALL[index % ACTION_COUNT]
    }

    /// Column index in 0..[`ACTION_COUNT`].
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// `(left, right)` wheel speeds for this action.
    #[inline]
    pub fn speeds(self) -> (i8, i8) {
        ACTION_SPEEDS[self.index()]
    }
}

/// Learning-rate pair for [`QTable::update`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TdRates {
    /// Step size.
    pub alpha: Frac,
    /// Discount on the bootstrapped next-state value.
    pub gamma: Frac,
}

/// The action-value table. 400 bytes; initialised to all zeros.
#[derive(Clone, PartialEq, Eq)]
pub struct QTable {
    values: [[QValue; ACTION_COUNT]; STATE_COUNT],
}

impl QTable {
    /// A table with every entry at 0.
    pub const fn new() -> Self {
        Self {
            values: [[0; ACTION_COUNT]; STATE_COUNT],
        }
    }

    /// Value of one (state, action) pair.
    #[inline]
    pub fn get(&self, state: StateIndex, action: Action) -> QValue {
        self.values[state.get()][action.index()]
    }

    /// Overwrite one entry.
    #[inline]
    pub fn set(&mut self, state: StateIndex, action: Action, value: QValue) {
        self.values[state.get()][action.index()] = value;
    }

    /// The full row for a state.
    #[inline]
    pub fn row(&self, state: StateIndex) -> &[QValue; ACTION_COUNT] {
        &self.values[state.get()]
    }

    /// Greedy action and its value. Ties resolve to the lowest action id.
    pub fn best_action(&self, state: StateIndex) -> (Action, QValue) {
        let row = self.row(state);
        let mut best = 0usize;
        for a in 1..ACTION_COUNT {
            if row[a] > row[best] {
                best = a;
            }
        }
        (Action::from_index(best), row[best])
    }

    /// Maximum value over all actions of a state.
    #[inline]
    pub fn max_value(&self, state: StateIndex) -> QValue {
        self.best_action(state).1
    }

    /// Apply one temporal-difference update and return the new value.
    ///
    /// `reward` is clamped to the `i16` range first, so every intermediate
    /// stays within `i32`. Any reward that large saturates the entry anyway.
    pub fn update(
        &mut self,
        state: StateIndex,
        action: Action,
        reward: i32,
        next: StateIndex,
        rates: TdRates,
    ) -> QValue {
        let reward = reward.clamp(i16::MIN as i32, i16::MAX as i32);
        let current = self.get(state, action) as i32;
        let target = reward + rates.gamma.apply(self.max_value(next) as i32);
        let delta = target - current;
        let updated = saturate_q(current + rates.alpha.apply(delta));
        self.set(state, action, updated);
        updated
    }

    /// Number of entries that have moved away from zero.
    pub fn visited_entries(&self) -> usize {
        self.values.iter().flatten().filter(|&&v| v != 0).count()
    }
}

impl Default for QTable {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Debug for QTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("QTable")
            .field("states", &STATE_COUNT)
            .field("actions", &ACTION_COUNT)
            .field("visited_entries", &self.visited_entries())
            .finish()
    }
}
