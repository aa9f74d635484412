//! Common thresholds and helper functions for candlestick rules
//!
//! Default geometry thresholds and per-pattern confidences shared across all
//! rule modules.

use crate::{OHLCVExt, Ratio, OHLCV};

// ============================================================
// GEOMETRY THRESHOLDS
// ============================================================

/// Hammer: lower shadow >= body * HAMMER_LOWER_SHADOW_FACTOR
pub const HAMMER_LOWER_SHADOW_FACTOR: f64 = 2.0;
/// Hammer: upper shadow <= body * HAMMER_UPPER_SHADOW_FACTOR
pub const HAMMER_UPPER_SHADOW_FACTOR: f64 = 0.1;
/// Hammer: a body no larger than this share of the range counts as empty, and
/// its upper shadow may then reach the same share of the range.
pub const HAMMER_WICK_TOLERANCE_RATIO: f64 = 0.005;

/// Star: first candle body must cover at least this share of its range
pub const STAR_FIRST_BODY_RATIO: f64 = 0.5;
/// Star: middle candle body < first body * STAR_BODY_RATIO
pub const STAR_BODY_RATIO: f64 = 0.3;
/// Star: third candle body > first body * STAR_THIRD_BODY_RATIO
pub const STAR_THIRD_BODY_RATIO: f64 = 0.5;

/// Doji: body <= range * DOJI_BODY_RATIO
pub const DOJI_BODY_RATIO: f64 = 0.1;
/// Doji: a shadow dominates when it is at least this many times the other one
pub const DOJI_SHADOW_DOMINANCE_FACTOR: f64 = 2.0;
/// Long-legged doji: both shadows >= range * DOJI_LONG_LEG_RATIO
pub const DOJI_LONG_LEG_RATIO: f64 = 0.4;

// ============================================================
// CONFIDENCES
// ============================================================

pub const HAMMER_CONFIDENCE: Ratio = Ratio::new_const(0.75);
pub const ENGULFING_CONFIDENCE: Ratio = Ratio::new_const(0.80);
pub const STAR_CONFIDENCE: Ratio = Ratio::new_const(0.85);
pub const DRAGONFLY_DOJI_CONFIDENCE: Ratio = Ratio::new_const(0.70);
pub const GRAVESTONE_DOJI_CONFIDENCE: Ratio = Ratio::new_const(0.70);
pub const LONG_LEGGED_DOJI_CONFIDENCE: Ratio = Ratio::new_const(0.60);
pub const DOJI_CONFIDENCE: Ratio = Ratio::new_const(0.50);

// ============================================================
// HELPER FUNCTIONS
// ============================================================

/// Last `n` bars of the window. None if fewer are available or any of them
/// carries a non-finite price.
#[inline]
pub fn tail<T: OHLCV>(bars: &[T], n: usize) -> Option<&[T]> {
    let start = bars.len().checked_sub(n)?;
    let window = &bars[start..];
    window.iter().all(|b| b.is_finite()).then_some(window)
}

/// True if `curr`'s body strictly contains `prev`'s body on both ends
#[inline]
pub fn body_engulfs<T: OHLCV>(prev: &T, curr: &T) -> bool {
    curr.body_bottom() < prev.body_bottom() && curr.body_top() > prev.body_top()
}

/// Check that a threshold is finite and non-negative
#[inline]
pub fn check_factor(name: &'static str, value: f64) -> crate::Result<()> {
    if !value.is_finite() || value < 0.0 {
        return Err(crate::PatternError::OutOfRange {
            field: name,
            value,
            min: 0.0,
            max: f64::MAX,
        });
    }
    Ok(())
}
