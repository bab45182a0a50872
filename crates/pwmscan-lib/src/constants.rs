//! Constants and configuration for pwmscan
//!
//! This module defines the fixed-point scale, the unrecognized-symbol
//! sentinel and the penalty applied to windows that contain it.

/// Sentinel written into encoded streams for characters outside the alphabet
pub const UNRECOGNIZED: i32 = -1;

/// Fixed-point scale applied to matrix scores and thresholds
///
/// Scores are multiplied by this factor and truncated toward zero before
/// scanning, and divided by it again when hits are reported.
pub const SCORE_SCALE: f64 = 1000.0;

/// Fixed-point contribution of one unrecognized symbol inside a window
pub const UNRECOGNIZED_PENALTY: i64 = -999_999;

/// Fixed-point floor substituted for `-inf` matrix entries when
/// non-finite scores are allowed
pub const NONFINITE_FLOOR: i32 = -999_999;

/// Placeholder written by [`crate::postprocess::add_gap_dots`]
pub const GAP_PLACEHOLDER: u8 = b'.';

/// Default alphabet used by the CLI
pub const DEFAULT_ALPHABET: &str = "ACGT";

/// Version number
pub const VERSION: (u8, u8, u8) = (0, 1, 0);

/// Scale a caller score into fixed point, truncating toward zero
///
/// Values outside the `i32` range saturate.
#[inline]
pub fn to_fixed(value: f64) -> i32 {
    (value * SCORE_SCALE) as i32
}

/// Scale a caller threshold into fixed point, truncating toward zero
#[inline]
pub fn threshold_to_fixed(value: f64) -> i64 {
    (value * SCORE_SCALE) as i64
}

/// Rescale a fixed-point score back to caller units
#[inline]
pub fn from_fixed(value: i64) -> f64 {
    value as f64 / SCORE_SCALE
}
