//! Three-bar candlestick rules
//!
//! Patterns: Morning Star, Evening Star

use std::collections::HashMap;

use super::helpers::{self, tail};
use crate::{
  params::{get_ratio, ParamMeta, ParameterizedRule},
  Direction, OHLCVExt, Pattern, PatternMatch, PatternRule, Ratio, Result, OHLCV,
};

impl_with_defaults!(MorningStarRule, EveningStarRule);

/// Shared star geometry. `direction` is the direction of the reversal:
/// Bullish for Morning Star (bearish first, bullish third), Bearish for Evening Star.
#[derive(Debug, Clone, Copy)]
struct StarShape {
  first_body_ratio: f64,
  star_body_ratio: f64,
  third_body_ratio: f64,
}

impl StarShape {
  fn matches<T: OHLCV>(&self, first: &T, star: &T, third: &T, direction: Direction) -> bool {
    let (first_ok, third_ok) = match direction {
      Direction::Bullish => (first.is_bearish(), third.is_bullish()),
      Direction::Bearish => (first.is_bullish(), third.is_bearish()),
      Direction::Neutral => return false,
    };
    if !first_ok || !third_ok {
      return false;
    }

    // First candle needs a substantial body
    let first_body = first.body();
    match first.body_ratio() {
      Some(ratio) if ratio >= self.first_body_ratio => {},
      _ => return false,
    }

    if star.body() >= first_body * self.star_body_ratio {
      return false;
    }
    if third.body() <= first_body * self.third_body_ratio {
      return false;
    }

    let midpoint = first.body_midpoint();
    match direction {
      Direction::Bullish => third.close() > midpoint,
      _ => third.close() < midpoint,
    }
  }
}

// ============================================================
// STAR PATTERNS
// ============================================================

/// Morning Star - bearish candle, small star, bullish candle closing above the first midpoint
#[derive(Debug, Clone, Copy)]
pub struct MorningStarRule {
  pub first_body_ratio: Ratio,
  pub star_body_ratio: Ratio,
  pub third_body_ratio: Ratio,
  pub confidence: Ratio,
}

impl Default for MorningStarRule {
  fn default() -> Self {
    Self {
      first_body_ratio: Ratio::new_const(helpers::STAR_FIRST_BODY_RATIO),
      star_body_ratio: Ratio::new_const(helpers::STAR_BODY_RATIO),
      third_body_ratio: Ratio::new_const(helpers::STAR_THIRD_BODY_RATIO),
      confidence: helpers::STAR_CONFIDENCE,
    }
  }
}

impl MorningStarRule {
  fn shape(&self) -> StarShape {
    StarShape {
      first_body_ratio: self.first_body_ratio.get(),
      star_body_ratio: self.star_body_ratio.get(),
      third_body_ratio: self.third_body_ratio.get(),
    }
  }
}

impl PatternRule for MorningStarRule {
  fn name(&self) -> &'static str {
    "morning_star"
  }

  fn pattern(&self) -> Pattern {
    Pattern::MorningStar
  }

  fn min_bars(&self) -> usize {
    3
  }

  fn evaluate<T: OHLCV>(&self, bars: &[T]) -> PatternMatch {
    let Some([first, star, third]) = tail(bars, 3) else {
      return PatternMatch::miss(Pattern::MorningStar);
    };

    if self.shape().matches(first, star, third, Direction::Bullish) {
      PatternMatch::hit(Pattern::MorningStar, self.confidence)
    } else {
      PatternMatch::miss(Pattern::MorningStar)
    }
  }
}

/// Evening Star - bullish candle, small star, bearish candle closing below the first midpoint
#[derive(Debug, Clone, Copy)]
pub struct EveningStarRule {
  pub first_body_ratio: Ratio,
  pub star_body_ratio: Ratio,
  pub third_body_ratio: Ratio,
  pub confidence: Ratio,
}

impl Default for EveningStarRule {
  fn default() -> Self {
    Self {
      first_body_ratio: Ratio::new_const(helpers::STAR_FIRST_BODY_RATIO),
      star_body_ratio: Ratio::new_const(helpers::STAR_BODY_RATIO),
      third_body_ratio: Ratio::new_const(helpers::STAR_THIRD_BODY_RATIO),
      confidence: helpers::STAR_CONFIDENCE,
    }
  }
}

impl EveningStarRule {
  fn shape(&self) -> StarShape {
    StarShape {
      first_body_ratio: self.first_body_ratio.get(),
      star_body_ratio: self.star_body_ratio.get(),
      third_body_ratio: self.third_body_ratio.get(),
    }
  }
}

impl PatternRule for EveningStarRule {
  fn name(&self) -> &'static str {
    "evening_star"
  }

  fn pattern(&self) -> Pattern {
    Pattern::EveningStar
  }

  fn min_bars(&self) -> usize {
    3
  }

  fn evaluate<T: OHLCV>(&self, bars: &[T]) -> PatternMatch {
    let Some([first, star, third]) = tail(bars, 3) else {
      return PatternMatch::miss(Pattern::EveningStar);
    };

    if self.shape().matches(first, star, third, Direction::Bearish) {
      PatternMatch::hit(Pattern::EveningStar, self.confidence)
    } else {
      PatternMatch::miss(Pattern::EveningStar)
    }
  }
}

// ============================================================
// PARAMETER METADATA
// ============================================================

static STAR_PARAMS: &[ParamMeta] = &[
  ParamMeta::ratio(
    "first_body_ratio",
    helpers::STAR_FIRST_BODY_RATIO,
    (0.3, 0.8),
    "Minimum first-candle body as a share of its range",
  ),
  ParamMeta::ratio(
    "star_body_ratio",
    helpers::STAR_BODY_RATIO,
    (0.1, 0.5),
    "Maximum star body as a share of the first body",
  ),
  ParamMeta::ratio(
    "third_body_ratio",
    helpers::STAR_THIRD_BODY_RATIO,
    (0.3, 0.8),
    "Minimum third-candle body as a share of the first body",
  ),
  ParamMeta::ratio("confidence", 0.85, (0.0, 1.0), "Confidence reported on a match"),
];

fn star_ratios(params: &HashMap<&str, f64>) -> Result<(Ratio, Ratio, Ratio, Ratio)> {
  Ok((
    get_ratio(params, "first_body_ratio", helpers::STAR_FIRST_BODY_RATIO)?,
    get_ratio(params, "star_body_ratio", helpers::STAR_BODY_RATIO)?,
    get_ratio(params, "third_body_ratio", helpers::STAR_THIRD_BODY_RATIO)?,
    get_ratio(params, "confidence", helpers::STAR_CONFIDENCE.get())?,
  ))
}

impl ParameterizedRule for MorningStarRule {
  fn param_meta() -> &'static [ParamMeta] {
    STAR_PARAMS
  }

  fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
    let (first_body_ratio, star_body_ratio, third_body_ratio, confidence) = star_ratios(params)?;
    Ok(Self { first_body_ratio, star_body_ratio, third_body_ratio, confidence })
  }
}

impl ParameterizedRule for EveningStarRule {
  fn param_meta() -> &'static [ParamMeta] {
    STAR_PARAMS
  }

  fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
    let (first_body_ratio, star_body_ratio, third_body_ratio, confidence) = star_ratios(params)?;
    Ok(Self { first_body_ratio, star_body_ratio, third_body_ratio, confidence })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Bar;

  fn morning_star() -> [Bar; 3] {
    [
      Bar::new(110.0, 111.0, 99.0, 100.0),
      Bar::new(99.0, 99.5, 97.0, 98.0),
      Bar::new(100.0, 106.5, 99.5, 106.0),
    ]
  }

  fn evening_star() -> [Bar; 3] {
    [
      Bar::new(100.0, 111.0, 99.0, 110.0),
      Bar::new(111.0, 113.0, 110.5, 112.0),
      Bar::new(110.0, 110.5, 103.5, 104.0),
    ]
  }

  #[test]
  fn test_morning_star() {
    let m = MorningStarRule::with_defaults().evaluate(&morning_star());
    assert!(m.matched);
    assert_eq!(m.confidence, 0.85);
    assert!(!EveningStarRule::with_defaults().evaluate(&morning_star()).matched);
  }

  #[test]
  fn test_evening_star() {
    let m = EveningStarRule::with_defaults().evaluate(&evening_star());
    assert!(m.matched);
    assert_eq!(m.pattern, Pattern::EveningStar);
    assert!(!MorningStarRule::with_defaults().evaluate(&evening_star()).matched);
  }

  #[test]
  fn test_morning_star_third_below_midpoint() {
    let mut bars = morning_star();
    // body 6 > 5 but closes at 104 < 105
    bars[2] = Bar::new(98.0, 104.5, 97.5, 104.0);
    assert!(!MorningStarRule::with_defaults().evaluate(&bars).matched);
  }

  #[test]
  fn test_morning_star_large_star() {
    let mut bars = morning_star();
    bars[1] = Bar::new(99.0, 99.5, 95.0, 96.0);
    assert!(!MorningStarRule::with_defaults().evaluate(&bars).matched);
  }

  #[test]
  fn test_morning_star_weak_first_body() {
    let mut bars = morning_star();
    // body 10 over a range of 30
    bars[0] = Bar::new(110.0, 120.0, 90.0, 100.0);
    assert!(!MorningStarRule::with_defaults().evaluate(&bars).matched);
  }

  #[test]
  fn test_star_needs_three_bars() {
    let bars = morning_star();
    let m = MorningStarRule::with_defaults().evaluate(&bars[1..]);
    assert_eq!(m, PatternMatch::miss(Pattern::MorningStar));
  }
}
