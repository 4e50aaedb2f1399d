//! Epsilon-greedy action selection with a decaying exploration rate.
//!
//! Exploration draws from an injected [`RngCore`]; exploitation is a pure
//! function of the Q-table.

use rand::{Rng, RngCore};

use crate::fixed::{Frac, SCALE};
use crate::qtable::{Action, QTable, StateIndex, ACTION_COUNT};

/// Probability of taking a random action, as a [`Frac`] of 255.
///
/// Decays geometrically once per episode and never drops below its floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExplorationRate {
    current: Frac,
    floor: Frac,
    decay: Frac,
}

impl ExplorationRate {
    /// Start at `initial`, multiply by `decay` on each [`decay`](Self::decay),
    /// never going below `floor`.
    ///
    /// A floor above `initial` is lowered to `initial` so the rate stays
    /// non-increasing.
    pub fn new(initial: Frac, floor: Frac, decay: Frac) -> Self {
        Self {
            current: initial,
            floor: floor.min(initial),
            decay,
        }
    }

    /// Current rate.
    #[inline]
    pub fn get(&self) -> Frac {
        self.current
    }

    /// Floor the rate never goes below.
    #[inline]
    pub fn floor(&self) -> Frac {
        self.floor
    }

    /// Current rate as a whole percentage.
    #[inline]
    pub fn percent(&self) -> u8 {
        self.current.percent()
    }

    /// Apply one step of geometric decay and return the new rate.
    pub fn decay(&mut self) -> Frac {
        let next = self.current.of(self.decay).max(self.floor);
        self.current = next.min(self.current);
        self.current
    }
}

/// How an action was chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Choice {
    /// Uniformly random action.
    Explore(Action),
    /// Greedy action from the table.
    Exploit(Action),
}

impl Choice {
    /// The selected action.
    #[inline]
    pub fn action(self) -> Action {
        match self {
            Choice::Explore(a) | Choice::Exploit(a) => a,
        }
    }
}

/// Epsilon-greedy policy over a [`QTable`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EpsilonGreedy {
    /// Exploration schedule.
    pub epsilon: ExplorationRate,
}

impl EpsilonGreedy {
    /// Wrap an exploration schedule.
    pub fn new(epsilon: ExplorationRate) -> Self {
        Self { epsilon }
    }

    /// Pick an action for `state`.
    ///
    /// Draws a value in `0..255`; below epsilon the action is uniform over
    /// all actions, otherwise it is [`QTable::best_action`].
    pub fn select<R: RngCore>(
        &self,
        table: &QTable,
        state: StateIndex,
        rng: &mut R,
    ) -> Choice {
        let draw: u8 = rng.gen_range(0..SCALE as u8);
        if draw < self.epsilon.get().0 {
            Choice::Explore(Action::from_index(rng.gen_range(0..ACTION_COUNT)))
        } else {
            Choice::Exploit(table.best_action(state).0)
        }
    }
}
