//! The hospital course: ten named segments laid out along the guide line.
//!
//! The robot has no absolute localisation. Position is inferred from
//! cumulative wheel travel: each segment begins at a fixed distance
//! threshold, and the current segment is the highest one whose threshold
//! the odometer has reached.
//!
//! ```text
//!  0 START ─ 1 CORRIDOR_A ─ 2 PATIENT_ROOM_1 ─ 3 CORRIDOR_B ─ 4 PATIENT_ROOM_2
//!  ─ 5 NURSE_STATION ─ 6 PHARMACY ─ 7 CORRIDOR_C ─ 8 RADIOLOGY ─ 9 RETURN
//! ```

/// Number of course segments.
pub const SEGMENT_COUNT: usize = 10;

/// Cumulative encoder distance at which each segment begins. Ascending.
pub const SEGMENT_THRESHOLDS: [u32; SEGMENT_COUNT] = [
    0, 1_200, 2_600, 3_800, 5_200, 6_400, 7_800, 9_000, 10_400, 11_800,
];

/// Display names, used verbatim in the telemetry `LOC` field.
pub const SEGMENT_NAMES: [&str; SEGMENT_COUNT] = [
    "START",
    "CORRIDOR_A",
    "PATIENT_ROOM_1",
    "CORRIDOR_B",
    "PATIENT_ROOM_2",
    "NURSE_STATION",
    "PHARMACY",
    "CORRIDOR_C",
    "RADIOLOGY",
    "RETURN",
];

/// One zone of the course, 0..=9.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "u8"))]
pub struct Segment(u8);

impl Segment {
    /// Starting zone.
    pub const START: Segment = Segment(0);
    /// Segment where centred travel earns the stop bonus.
    pub const NURSE_STATION: Segment = Segment(5);
    /// Final zone; reaching it with every task done completes the episode.
    pub const RETURN: Segment = Segment(9);

    /// Construct a segment, clamping out-of-range indices to [`Segment::RETURN`].
    #[inline]
    pub const fn new(index: u8) -> Self {
        if index as usize >= SEGMENT_COUNT {
            Segment((SEGMENT_COUNT - 1) as u8)
        } else {
            Segment(index)
        }
    }

    /// Ordinal in 0..10.
    #[inline]
    pub const fn index(self) -> u8 {
        self.0
    }

    /// Human-readable zone name.
    #[inline]
    pub fn name(self) -> &'static str {
        SEGMENT_NAMES[self.0 as usize]
    }

    /// Select the segment for a cumulative distance.
    ///
    /// Scans the threshold table from the top down and returns the first
    /// threshold `<= distance`; a distance exactly on a threshold belongs to
    /// the new segment.
    pub fn for_distance(distance: u32) -> Self {
        for i in (0..SEGMENT_COUNT).rev() {
            if distance >= SEGMENT_THRESHOLDS[i] {
                return Segment(i as u8);
            }
        }
        Segment::START
    }
}

impl From<u8> for Segment {
    /// Clamps like [`Segment::new`].
    fn from(index: u8) -> Self {
        Segment::new(index)
    }
}

impl core::fmt::Display for Segment {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// Signed per-wheel encoder counts accumulated since the previous read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WheelDeltas {
    /// Left wheel counts.
    pub left: i16,
    /// Right wheel counts.
    pub right: i16,
}

impl WheelDeltas {
    /// Construct from a left/right pair.
    pub const fn new(left: i16, right: i16) -> Self {
        Self { left, right }
    }

    /// Unsigned travel for this tick: mean of the absolute wheel deltas.
    #[inline]
    pub fn travel(self) -> u32 {
        (self.left.unsigned_abs() as u32 + self.right.unsigned_abs() as u32) / 2
    }
}

/// Cumulative travel and the segment it implies.
///
/// Distance only grows, so the segment is monotonically non-decreasing
/// within an episode.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Odometer {
    distance: u32,
    segment: Segment,
}

impl Odometer {
    /// A fresh odometer at distance 0 in [`Segment::START`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one tick of wheel travel.
    ///
    /// Returns `Some(segment)` exactly when the selected segment differs from
    /// the previous tick's.
    pub fn advance(&mut self, deltas: WheelDeltas) -> Option<Segment> {
        self.distance = self.distance.saturating_add(deltas.travel());
        let next = Segment::for_distance(self.distance);
        if next != self.segment {
            self.segment = next;
            Some(next)
        } else {
            None
        }
    }

    /// Cumulative travel in encoder counts.
    pub fn distance(&self) -> u32 {
        self.distance
    }

    /// Current segment.
    pub fn segment(&self) -> Segment {
        self.segment
    }
}
