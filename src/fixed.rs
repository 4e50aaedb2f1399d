/*
 * This source code is licensed under the Business Source License 1.1.
 * See LICENSE in the root directory for full details.
 */

//! Fixed-point scalar helpers.
//!
//! The target has no FPU, so every rate in the crate is an 8-bit fraction of
//! [`SCALE`] and every product is taken in an `i32` intermediate before being
//! divided back down.
//!
//! # Invariants
//!
//! - Division truncates toward zero (`38 * 7 / 255 == 1`, `38 * -7 / 255 == -1`).
//! - [`saturate_q`] never wraps: out-of-range values pin to the nearest bound.
//! - `i32` intermediates cannot overflow for any `Frac` × `i16` operand.

/// Denominator of every [`Frac`]. A `Frac(255)` is 1.0.
pub const SCALE: i32 = 255;

/// Smallest representable Q-value.
pub const Q_MIN: i32 = i8::MIN as i32;

/// Largest representable Q-value.
pub const Q_MAX: i32 = i8::MAX as i32;

/// An 8-bit fixed-point fraction `n / 255`.
///
/// Used for the learning rate, the discount factor and the exploration rate.
///
/// ```rust
/// use wardbot_core::fixed::Frac;
///
/// let alpha = Frac(38); // ≈ 0.15
/// assert_eq!(alpha.apply(7), 1);
/// assert_eq!(alpha.percent(), 14);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Frac(pub u8);

impl Frac {
    /// Zero.
    pub const ZERO: Frac = Frac(0);
    /// One (255 / 255).
    pub const ONE: Frac = Frac(u8::MAX);

    /// Multiply `value` by this fraction, truncating toward zero.
    #[inline]
    pub fn apply(self, value: i32) -> i32 {
        value * self.0 as i32 / SCALE
    }

    /// The fraction as a whole percentage (truncated), 0..=100.
    #[inline]
    pub fn percent(self) -> u8 {
        (self.0 as u16 * 100 / SCALE as u16) as u8
    }

    /// Compose two fractions: `self × other`, truncated.
    #[inline]
    pub fn of(self, other: Frac) -> Frac {
        Frac((self.0 as u16 * other.0 as u16 / SCALE as u16) as u8)
    }
}

/// Clamp an `i32` into the Q-value range [-128, 127].
#[inline]
pub fn saturate_q(value: i32) -> i8 {
    value.clamp(Q_MIN, Q_MAX) as i8
}

/// `num / den` as a whole percentage, 0 when `den` is 0, capped at 100.
#[inline]
pub fn ratio_percent(num: u32, den: u32) -> u8 {
    if den == 0 {
        return 0;
    }
    let pct = num as u64 * 100 / den as u64;
    pct.min(100) as u8
}
