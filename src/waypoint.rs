//! One-shot task waypoints along the course.
//!
//! Each waypoint is tied to one segment. The first time an episode enters
//! that segment the task is marked complete and earns [`WAYPOINT_BONUS`].
//! Flags are only cleared by starting a new episode.

use heapless::Vec;

use crate::course::Segment;

/// Number of task waypoints.
pub const WAYPOINT_COUNT: usize = 5;

/// One-time reward added to the episode total on first visit.
pub const WAYPOINT_BONUS: i32 = 30;

/// Percent of the task-completion rate each finished waypoint is worth.
pub const TASK_RATE_STEP: u8 = (100 / WAYPOINT_COUNT) as u8;

/// A named task location.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Waypoint {
    /// Bit position in the completion set, 0..5.
    pub id: u8,
    /// Segment that completes this task.
    pub segment: Segment,
    /// Task label.
    pub name: &'static str,
}

/// The five course tasks in route order.
pub const WAYPOINTS: [Waypoint; WAYPOINT_COUNT] = [
    Waypoint { id: 0, segment: Segment::new(2), name: "PATIENT_ROOM_1" },
    Waypoint { id: 1, segment: Segment::new(4), name: "PATIENT_ROOM_2" },
    Waypoint { id: 2, segment: Segment::NURSE_STATION, name: "NURSE_STATION" },
    Waypoint { id: 3, segment: Segment::new(6), name: "PHARMACY" },
    Waypoint { id: 4, segment: Segment::new(8), name: "RADIOLOGY" },
];

/// Waypoints newly completed by one visit.
pub type Hits = Vec<Waypoint, WAYPOINT_COUNT>;

/// Five-bit completion set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WaypointTracker {
    flags: u8,
    completed: u8,
}

impl WaypointTracker {
    /// All tasks outstanding.
    pub const fn new() -> Self {
        Self { flags: 0, completed: 0 }
    }

    /// Mark every outstanding waypoint on `segment` as done.
    ///
    /// Returns the waypoints completed by this call; empty on a revisit.
    pub fn visit(&mut self, segment: Segment) -> Hits {
        let mut hits = Hits::new();
        for wp in WAYPOINTS.iter() {
            let bit = 1u8 << wp.id;
            if self.flags & bit == 0 && wp.segment == segment {
                self.flags |= bit;
                self.completed += 1;
                // Capacity equals the table length, so this cannot fail.
                let _ = hits.push(*wp);
            }
        }
        hits
    }

    /// Raw completion bits, bit `i` for waypoint `i`.
    #[inline]
    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// Number of completed tasks, 0..=5.
    #[inline]
    pub fn completed(&self) -> u8 {
        self.completed
    }

    /// `true` once every task is done.
    #[inline]
    pub fn all_complete(&self) -> bool {
        self.completed as usize == WAYPOINT_COUNT
    }

    /// Task-completion rate: 20 % per finished task.
    #[inline]
    pub fn completion_percent(&self) -> u8 {
        self.completed * TASK_RATE_STEP
    }
}
