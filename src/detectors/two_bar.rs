//! Two-bar candlestick rules
//!
//! Patterns: Bullish Engulfing, Bearish Engulfing

use std::collections::HashMap;

use super::helpers::{self, body_engulfs, tail};
use crate::{
    params::{get_ratio, ParamMeta, ParameterizedRule},
    OHLCVExt, Pattern, PatternMatch, PatternRule, Ratio, Result, OHLCV,
};

impl_with_defaults!(BullishEngulfingRule, BearishEngulfingRule);

// ============================================================
// ENGULFING PATTERNS
// ============================================================

/// Bullish Engulfing - a bullish body strictly containing the prior bearish body
#[derive(Debug, Clone, Copy)]
pub struct BullishEngulfingRule {
    pub confidence: Ratio,
}

impl Default for BullishEngulfingRule {
    fn default() -> Self {
        Self {
            confidence: helpers::ENGULFING_CONFIDENCE,
        }
    }
}

impl PatternRule for BullishEngulfingRule {
    fn name(&self) -> &'static str {
        "bullish_engulfing"
    }

    fn pattern(&self) -> Pattern {
        Pattern::BullishEngulfing
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn evaluate<T: OHLCV>(&self, bars: &[T]) -> PatternMatch {
        let Some([prev, curr]) = tail(bars, 2) else {
            return PatternMatch::miss(Pattern::BullishEngulfing);
        };

        if prev.is_bearish() && curr.is_bullish() && body_engulfs(prev, curr) {
            PatternMatch::hit(Pattern::BullishEngulfing, self.confidence)
        } else {
            PatternMatch::miss(Pattern::BullishEngulfing)
        }
    }
}

/// Bearish Engulfing - a bearish body strictly containing the prior bullish body
#[derive(Debug, Clone, Copy)]
pub struct BearishEngulfingRule {
    pub confidence: Ratio,
}

impl Default for BearishEngulfingRule {
    fn default() -> Self {
        Self {
            confidence: helpers::ENGULFING_CONFIDENCE,
        }
    }
}

impl PatternRule for BearishEngulfingRule {
    fn name(&self) -> &'static str {
        "bearish_engulfing"
    }

    fn pattern(&self) -> Pattern {
        Pattern::BearishEngulfing
    }

    fn min_bars(&self) -> usize {
        2
    }

    fn evaluate<T: OHLCV>(&self, bars: &[T]) -> PatternMatch {
        let Some([prev, curr]) = tail(bars, 2) else {
            return PatternMatch::miss(Pattern::BearishEngulfing);
        };

        if prev.is_bullish() && curr.is_bearish() && body_engulfs(prev, curr) {
            PatternMatch::hit(Pattern::BearishEngulfing, self.confidence)
        } else {
            PatternMatch::miss(Pattern::BearishEngulfing)
        }
    }
}

// ============================================================
// PARAMETER METADATA
// ============================================================

static ENGULFING_PARAMS: &[ParamMeta] = &[ParamMeta::ratio(
    "confidence",
    0.80,
    (0.0, 1.0),
    "Confidence reported on a match",
)];

impl ParameterizedRule for BullishEngulfingRule {
    fn param_meta() -> &'static [ParamMeta] {
        ENGULFING_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            confidence: get_ratio(params, "confidence", helpers::ENGULFING_CONFIDENCE.get())?,
        })
    }
}

impl ParameterizedRule for BearishEngulfingRule {
    fn param_meta() -> &'static [ParamMeta] {
        ENGULFING_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            confidence: get_ratio(params, "confidence", helpers::ENGULFING_CONFIDENCE.get())?,
        })
    }
}
