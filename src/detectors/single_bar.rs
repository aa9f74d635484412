//! Single-bar candlestick rules
//!
//! Patterns: Hammer, and the Doji family classifier (Dragonfly, Gravestone,
//! Long-Legged, plain Doji).

use std::collections::HashMap;

use super::helpers::{self, check_factor, tail};
use crate::{
    params::{get_factor, get_ratio, ParamMeta, ParameterizedRule},
    OHLCVExt, Pattern, PatternMatch, PatternRule, Ratio, Result, OHLCV,
};

impl_with_defaults!(HammerRule, DojiRule);

// ============================================================
// HAMMER
// ============================================================

/// Hammer - small body on top of a long lower shadow, almost no upper shadow
#[derive(Debug, Clone, Copy)]
pub struct HammerRule {
    pub lower_shadow_factor: f64,
    pub upper_shadow_factor: f64,
    pub wick_tolerance: f64,
    pub confidence: Ratio,
}

impl Default for HammerRule {
    fn default() -> Self {
        Self {
            lower_shadow_factor: helpers::HAMMER_LOWER_SHADOW_FACTOR,
            upper_shadow_factor: helpers::HAMMER_UPPER_SHADOW_FACTOR,
            wick_tolerance: helpers::HAMMER_WICK_TOLERANCE_RATIO,
            confidence: helpers::HAMMER_CONFIDENCE,
        }
    }
}

impl PatternRule for HammerRule {
    fn name(&self) -> &'static str {
        "hammer"
    }

    fn pattern(&self) -> Pattern {
        Pattern::Hammer
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn evaluate<T: OHLCV>(&self, bars: &[T]) -> PatternMatch {
        let Some([bar]) = tail(bars, 1) else {
            return PatternMatch::miss(Pattern::Hammer);
        };

        let range = bar.range();
        let body = bar.body();
        let upper = bar.upper_shadow();
        let lower = bar.lower_shadow();

        if range <= f64::EPSILON || lower <= 0.0 {
            return PatternMatch::miss(Pattern::Hammer);
        }
        if lower < body * self.lower_shadow_factor {
            return PatternMatch::miss(Pattern::Hammer);
        }
        let tolerance = range * self.wick_tolerance;
        let max_upper = if body <= tolerance {
            tolerance
        } else {
            body * self.upper_shadow_factor
        };
        if upper > max_upper {
            return PatternMatch::miss(Pattern::Hammer);
        }

        PatternMatch::hit(Pattern::Hammer, self.confidence)
    }

    fn validate_config(&self) -> Result<()> {
        check_factor("lower_shadow_factor", self.lower_shadow_factor)?;
        check_factor("upper_shadow_factor", self.upper_shadow_factor)?;
        check_factor("wick_tolerance", self.wick_tolerance)
    }
}

// ============================================================
// DOJI FAMILY
// ============================================================

/// Doji classifier - body at most a tenth of the range, refined by shadow shape
#[derive(Debug, Clone, Copy)]
pub struct DojiRule {
    pub body_ratio: Ratio,
    pub dominance_factor: f64,
    pub long_leg_ratio: Ratio,
    pub dragonfly_confidence: Ratio,
    pub gravestone_confidence: Ratio,
    pub long_legged_confidence: Ratio,
    pub doji_confidence: Ratio,
}

impl Default for DojiRule {
    fn default() -> Self {
        Self {
            body_ratio: Ratio::new_const(helpers::DOJI_BODY_RATIO),
            dominance_factor: helpers::DOJI_SHADOW_DOMINANCE_FACTOR,
            long_leg_ratio: Ratio::new_const(helpers::DOJI_LONG_LEG_RATIO),
            dragonfly_confidence: helpers::DRAGONFLY_DOJI_CONFIDENCE,
            gravestone_confidence: helpers::GRAVESTONE_DOJI_CONFIDENCE,
            long_legged_confidence: helpers::LONG_LEGGED_DOJI_CONFIDENCE,
            doji_confidence: helpers::DOJI_CONFIDENCE,
        }
    }
}

impl PatternRule for DojiRule {
    fn name(&self) -> &'static str {
        "doji"
    }

    fn pattern(&self) -> Pattern {
        Pattern::Doji
    }

    fn min_bars(&self) -> usize {
        1
    }

    fn evaluate<T: OHLCV>(&self, bars: &[T]) -> PatternMatch {
        let Some([bar]) = tail(bars, 1) else {
            return PatternMatch::miss(Pattern::Doji);
        };

        // high == low: no shape to classify
        let range = bar.range();
        if range <= f64::EPSILON {
            return PatternMatch::miss(Pattern::Doji);
        }
        if bar.body() > range * self.body_ratio.get() {
            return PatternMatch::miss(Pattern::Doji);
        }

        let upper = bar.upper_shadow();
        let lower = bar.lower_shadow();
        let long_leg = range * self.long_leg_ratio.get();

        if lower > 0.0 && lower >= upper * self.dominance_factor {
            PatternMatch::hit(Pattern::DragonflyDoji, self.dragonfly_confidence)
        } else if upper > 0.0 && upper >= lower * self.dominance_factor {
            PatternMatch::hit(Pattern::GravestoneDoji, self.gravestone_confidence)
        } else if upper >= long_leg && lower >= long_leg {
            PatternMatch::hit(Pattern::LongLeggedDoji, self.long_legged_confidence)
        } else {
            PatternMatch::hit(Pattern::Doji, self.doji_confidence)
        }
    }

    fn validate_config(&self) -> Result<()> {
        check_factor("dominance_factor", self.dominance_factor)
    }
}

// ============================================================
// PARAMETER METADATA
// ============================================================

static HAMMER_PARAMS: &[ParamMeta] = &[
    ParamMeta::factor(
        "lower_shadow_factor",
        helpers::HAMMER_LOWER_SHADOW_FACTOR,
        (1.0, 4.0),
        "Minimum lower shadow as a multiple of the body",
    ),
    ParamMeta::factor(
        "upper_shadow_factor",
        helpers::HAMMER_UPPER_SHADOW_FACTOR,
        (0.0, 0.5),
        "Maximum upper shadow as a multiple of the body",
    ),
    ParamMeta::ratio(
        "wick_tolerance",
        helpers::HAMMER_WICK_TOLERANCE_RATIO,
        (0.0, 0.05),
        "Empty-body threshold and its upper shadow allowance, as a share of the range",
    ),
    ParamMeta::ratio("confidence", 0.75, (0.0, 1.0), "Confidence reported on a match"),
];

static DOJI_PARAMS: &[ParamMeta] = &[
    ParamMeta::ratio(
        "body_ratio",
        helpers::DOJI_BODY_RATIO,
        (0.05, 0.2),
        "Maximum body as a share of the range",
    ),
    ParamMeta::factor(
        "dominance_factor",
        helpers::DOJI_SHADOW_DOMINANCE_FACTOR,
        (1.5, 4.0),
        "Shadow ratio at which one shadow dominates the other",
    ),
    ParamMeta::ratio(
        "long_leg_ratio",
        helpers::DOJI_LONG_LEG_RATIO,
        (0.3, 0.45),
        "Minimum share of the range for both shadows of a long-legged doji",
    ),
    ParamMeta::ratio("dragonfly_confidence", 0.70, (0.0, 1.0), "Dragonfly doji confidence"),
    ParamMeta::ratio("gravestone_confidence", 0.70, (0.0, 1.0), "Gravestone doji confidence"),
    ParamMeta::ratio(
        "long_legged_confidence",
        0.60,
        (0.0, 1.0),
        "Long-legged doji confidence",
    ),
    ParamMeta::ratio("doji_confidence", 0.50, (0.0, 1.0), "Plain doji confidence"),
];

impl ParameterizedRule for HammerRule {
    fn param_meta() -> &'static [ParamMeta] {
        HAMMER_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            lower_shadow_factor: get_factor(params, "lower_shadow_factor", d.lower_shadow_factor)?,
            upper_shadow_factor: get_factor(params, "upper_shadow_factor", d.upper_shadow_factor)?,
            wick_tolerance: get_ratio(params, "wick_tolerance", d.wick_tolerance)?.get(),
            confidence: get_ratio(params, "confidence", d.confidence.get())?,
        })
    }
}

impl ParameterizedRule for DojiRule {
    fn param_meta() -> &'static [ParamMeta] {
        DOJI_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let d = Self::default();
        Ok(Self {
            body_ratio: get_ratio(params, "body_ratio", d.body_ratio.get())?,
            dominance_factor: get_factor(params, "dominance_factor", d.dominance_factor)?,
            long_leg_ratio: get_ratio(params, "long_leg_ratio", d.long_leg_ratio.get())?,
            dragonfly_confidence: get_ratio(
                params,
                "dragonfly_confidence",
                d.dragonfly_confidence.get(),
            )?,
            gravestone_confidence: get_ratio(
                params,
                "gravestone_confidence",
                d.gravestone_confidence.get(),
            )?,
            long_legged_confidence: get_ratio(
                params,
                "long_legged_confidence",
                d.long_legged_confidence.get(),
            )?,
            doji_confidence: get_ratio(params, "doji_confidence", d.doji_confidence.get())?,
        })
    }
}
