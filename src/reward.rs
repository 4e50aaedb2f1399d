//! Per-tick reward shaping.
//!
//! Reward depends only on where the robot is, never on what it did.
//!
//! | line state | base |
//! |---|---|
//! | Center | +3 (+5 more on the nurse-station segment) |
//! | SlightLeft / SlightRight | +1 |
//! | Lost | −10 |
//! | anything else | −1 |
//!
//! A flat −1 time penalty is applied on top, so the per-tick range is [−11, 7].

use crate::course::Segment;
use crate::line::LineState;

/// Reward for travelling centred on the line.
pub const CENTER_REWARD: i32 = 3;
/// Reward for a small lateral error.
pub const SLIGHT_REWARD: i32 = 1;
/// Penalty for losing the line entirely.
pub const LOST_PENALTY: i32 = -10;
/// Penalty for a large lateral error.
pub const OFF_CENTER_PENALTY: i32 = -1;
/// Extra reward for being centred on [`Segment::NURSE_STATION`].
pub const STATION_BONUS: i32 = 5;
/// Unconditional per-tick cost.
pub const TIME_PENALTY: i32 = -1;

/// Reward before the time penalty.
pub fn shaped_reward(line: LineState, segment: Segment) -> i32 {
    match line {
        LineState::Center if segment == Segment::NURSE_STATION => CENTER_REWARD + STATION_BONUS,
        LineState::Center => CENTER_REWARD,
        LineState::SlightLeft | LineState::SlightRight => SLIGHT_REWARD,
        LineState::Lost => LOST_PENALTY,
        _ => OFF_CENTER_PENALTY,
    }
}

/// Net reward for one tick.
#[inline]
pub fn tick_reward(line: LineState, segment: Segment) -> i32 {
    shaped_reward(line, segment) + TIME_PENALTY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::SEGMENT_COUNT;

    #[test]
    fn test_nurse_station_bonus() {
        assert_eq!(shaped_reward(LineState::Center, Segment::NURSE_STATION), 8);
        assert_eq!(tick_reward(LineState::Center, Segment::NURSE_STATION), 7);
        // Bonus only applies when centred.
        assert_eq!(tick_reward(LineState::SlightLeft, Segment::NURSE_STATION), 0);
    }

    #[test]
    fn test_reward_table() {
        let seg = Segment::new(1);
        let cases: &[(LineState, i32)] = &[
            (LineState::Center, 2),
            (LineState::SlightLeft, 0),
            (LineState::SlightRight, 0),
            (LineState::Lost, -11),
            (LineState::Left, -2),
            (LineState::Right, -2),
            (LineState::FarLeft, -2),
            (LineState::FarRight, -2),
        ];
        for &(line, expected) in cases {
            assert_eq!(tick_reward(line, seg), expected, "line={:?}", line);
        }
    }

    #[test]
    fn test_reward_bounded() {
        for i in 0..SEGMENT_COUNT as u8 {
            for line in LineState::ALL {
                let r = tick_reward(line, Segment::new(i));
                assert!((-11..=7).contains(&r), "r={} line={:?} seg={}", r, line, i);
            }
        }
    }
}
