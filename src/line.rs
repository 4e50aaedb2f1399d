//! Line-state classification from the reflectance sensor array.
//!
//! Five downward-facing sensors straddle the guide line. Each reading is
//! clamped, thresholded into one bit, and the resulting 5-bit pattern is
//! mapped onto one of eight ordinal [`LineState`]s.
//!
//! ```text
//!  bit:     0      1      2      3      4
//!         left  s.left center s.right right
//! ```
//!
//! Ambiguous and saturated patterns resolve toward "on the line" rather than
//! [`LineState::Lost`], so sensor glitches do not feed the lost-streak
//! termination.

/// Number of reflectance channels.
pub const SENSOR_COUNT: usize = 5;

/// Highest calibrated reading; anything above is clamped.
pub const SENSOR_MAX: u16 = 1000;

/// Number of [`LineState`] ordinals.
pub const LINE_STATE_COUNT: usize = 8;

const CENTER_BIT: u8 = 1 << 2;
const SLIGHT_LEFT_BIT: u8 = 1 << 1;
const SLIGHT_RIGHT_BIT: u8 = 1 << 3;
const LEFT_BIT: u8 = 1 << 0;
const RIGHT_BIT: u8 = 1 << 4;
const ALL_BITS: u8 = (1 << SENSOR_COUNT) - 1;

/// Discretised lateral position of the robot relative to the guide line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum LineState {
    /// No sensor sees the line.
    Lost = 0,
    /// Line far beyond the left edge of the array.
    FarLeft = 1,
    /// Line under the leftmost sensor.
    Left = 2,
    /// Line just left of center.
    SlightLeft = 3,
    /// Line under the center sensor.
    Center = 4,
    /// Line just right of center.
    SlightRight = 5,
    /// Line under the rightmost sensor.
    Right = 6,
    /// Line far beyond the right edge of the array.
    FarRight = 7,
}

impl LineState {
    /// All states in ordinal order.
    pub const ALL: [LineState; LINE_STATE_COUNT] = [
        LineState::Lost,
        LineState::FarLeft,
        LineState::Left,
        LineState::SlightLeft,
        LineState::Center,
        LineState::SlightRight,
        LineState::Right,
        LineState::FarRight,
    ];

    /// Ordinal in 0..8.
    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    /// `true` for [`LineState::Center`].
    #[inline]
    pub fn is_centered(self) -> bool {
        self == LineState::Center
    }
}

/// Thresholded sensor pattern, one bit per channel (bit 0 = leftmost).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SensorMask(pub u8);

impl SensorMask {
    /// Build the mask from raw readings. Readings are clamped to
    /// [`SENSOR_MAX`] before comparison against `activation`.
    pub fn from_readings(readings: &[u16; SENSOR_COUNT], activation: u16) -> Self {
        let mut bits = 0u8;
        for (i, &raw) in readings.iter().enumerate() {
            if raw.min(SENSOR_MAX) >= activation {
                bits |= 1 << i;
            }
        }
        SensorMask(bits)
    }

    /// Every sensor sees dark: the robot is over a line intersection.
    #[inline]
    pub fn is_saturated(self) -> bool {
        self.0 & ALL_BITS == ALL_BITS
    }

    /// Classify by fixed priority.
    pub fn classify(self) -> LineState {
        let bits = self.0 & ALL_BITS;
        if bits == 0 {
            LineState::Lost
        } else if bits == ALL_BITS || bits & CENTER_BIT != 0 {
            LineState::Center
        } else if bits & SLIGHT_LEFT_BIT != 0 {
            LineState::SlightLeft
        } else if bits & SLIGHT_RIGHT_BIT != 0 {
            LineState::SlightRight
        } else if bits & LEFT_BIT != 0 {
            LineState::Left
        } else if bits & RIGHT_BIT != 0 {
            LineState::Right
        } else {
            LineState::Center
        }
    }
}
