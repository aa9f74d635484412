//! # candle-signals - Candlestick Pattern Signals
//!
//! Detects a fixed set of candlestick formations on OHLCV data and turns the
//! strongest one into a BUY / SELL / HOLD trading signal.
//!
//! ## Quick Start
//!
//! ```rust
//! use candle_signals::prelude::*;
//!
//! let mut analyzer = AnalyzerBuilder::new()
//!     .with_all_defaults()
//!     .pair("BTC/USD")
//!     .build()
//!     .unwrap();
//!
//! // Small body at the top, long lower shadow
//! let bars = vec![Bar::new(100.0, 100.05, 90.0, 100.0)];
//! let signal = analyzer.analyze(&bars);
//!
//! assert_eq!(signal.pattern, Some(Pattern::Hammer));
//! assert_eq!(signal.signal_type, SignalType::Buy);
//! assert_eq!(analyzer.history().len(), 1);
//! ```

pub mod analyzer;
pub mod config;
pub mod detectors;
pub mod history;
pub mod params;
pub mod signal;

pub use analyzer::{analyze_parallel, select_best, AnalyzerBuilder, AnalyzerConfig, SignalAnalyzer};
pub use config::AnalyzerSettings;
pub use history::{HistorySummary, SignalHistory};
pub use signal::{Signal, SignalType};

pub mod prelude {
    pub use crate::{
        // Selector
        analyze_parallel,
        // Rules
        detectors::*,
        // Parameters
        params::{get_factor, get_ratio, ParamMeta, ParamType, ParameterizedRule},
        select_best,
        AnalyzerBuilder,
        AnalyzerConfig,
        // Configuration
        AnalyzerSettings,
        // Types
        Bar,
        BuiltinRule,
        Direction,
        // History
        HistorySummary,
        OHLCVExt,
        Pattern,
        // Errors
        PatternError,
        PatternMatch,
        // Core traits
        PatternRule,
        Ratio,
        Result,
        Signal,
        SignalAnalyzer,
        SignalHistory,
        SignalType,
        OHLCV,
    };
}

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, PatternError>;

/// Errors raised by configuration, rule validation and history I/O.
///
/// Signal analysis itself never fails; it always resolves to a [`Signal`].
#[derive(Debug, thiserror::Error)]
pub enum PatternError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid OHLCV at index {index}: {reason}")]
    InvalidOHLCV { index: usize, reason: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(PatternError::InvalidValue(
                "Ratio cannot be NaN or infinite",
            ));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(PatternError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    /// Create a Ratio from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLCV data trait
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;

    fn volume(&self) -> f64 {
        0.0
    }

    /// Bar time in milliseconds since the Unix epoch, if known
    fn timestamp(&self) -> Option<i64> {
        None
    }
}

impl<T: OHLCV + ?Sized> OHLCV for &T {
    fn open(&self) -> f64 {
        (**self).open()
    }

    fn high(&self) -> f64 {
        (**self).high()
    }

    fn low(&self) -> f64 {
        (**self).low()
    }

    fn close(&self) -> f64 {
        (**self).close()
    }

    fn volume(&self) -> f64 {
        (**self).volume()
    }

    fn timestamp(&self) -> Option<i64> {
        (**self).timestamp()
    }
}

/// Extension trait with computed properties for OHLCV data
pub trait OHLCVExt: OHLCV {
    #[inline]
    fn body(&self) -> f64 {
        (self.close() - self.open()).abs()
    }

    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    #[inline]
    fn upper_shadow(&self) -> f64 {
        self.high() - self.open().max(self.close())
    }

    #[inline]
    fn lower_shadow(&self) -> f64 {
        self.open().min(self.close()) - self.low()
    }

    #[inline]
    fn body_top(&self) -> f64 {
        self.open().max(self.close())
    }

    #[inline]
    fn body_bottom(&self) -> f64 {
        self.open().min(self.close())
    }

    #[inline]
    fn body_midpoint(&self) -> f64 {
        (self.open() + self.close()) / 2.0
    }

    #[inline]
    fn is_bullish(&self) -> bool {
        self.close() > self.open()
    }

    #[inline]
    fn is_bearish(&self) -> bool {
        self.close() < self.open()
    }

    /// True if all four prices are finite
    #[inline]
    fn is_finite(&self) -> bool {
        [self.open(), self.high(), self.low(), self.close()]
            .iter()
            .all(|p| p.is_finite())
    }

    /// Body as ratio of range. Returns None if range ≈ 0
    #[inline]
    fn body_ratio(&self) -> Option<f64> {
        let range = self.range();
        (range > f64::EPSILON).then(|| self.body() / range)
    }

    /// Validate OHLCV data consistency
    fn validate(&self) -> Result<()> {
        let prices = [self.open(), self.high(), self.low(), self.close()];
        if prices.iter().any(|p| p.is_nan()) {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "NaN in OHLCV",
            });
        }
        if prices.iter().any(|p| p.is_infinite()) {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "Infinite value in OHLCV",
            });
        }
        if prices.iter().any(|p| *p < 0.0) {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "negative price",
            });
        }
        if !self.volume().is_finite() {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "non-finite volume",
            });
        }
        if self.volume() < 0.0 {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "negative volume",
            });
        }
        if self.high() < self.low() {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "high < low",
            });
        }
        if self.low() > self.body_bottom() {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "low above open/close",
            });
        }
        if self.high() < self.body_top() {
            return Err(PatternError::InvalidOHLCV {
                index: 0,
                reason: "high below open/close",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV + ?Sized> OHLCVExt for T {}

// ============================================================
// BAR - owned OHLCV sample
// ============================================================

/// One OHLCV sample for a fixed time interval
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Bar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
    /// Milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl Bar {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume: 0.0,
            timestamp: None,
        }
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_timestamp(mut self, millis: i64) -> Self {
        self.timestamp = Some(millis);
        self
    }
}

impl OHLCV for Bar {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }
}

// ============================================================
// PATTERNS
// ============================================================

/// Supported candlestick formations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Pattern {
    #[serde(rename = "Hammer")]
    Hammer,
    #[serde(rename = "Bullish Engulfing")]
    BullishEngulfing,
    #[serde(rename = "Bearish Engulfing")]
    BearishEngulfing,
    #[serde(rename = "Morning Star")]
    MorningStar,
    #[serde(rename = "Evening Star")]
    EveningStar,
    #[serde(rename = "Dragonfly Doji")]
    DragonflyDoji,
    #[serde(rename = "Gravestone Doji")]
    GravestoneDoji,
    #[serde(rename = "Long-Legged Doji")]
    LongLeggedDoji,
    #[serde(rename = "Doji")]
    Doji,
}

impl Pattern {
    pub const ALL: [Pattern; 9] = [
        Pattern::Hammer,
        Pattern::BullishEngulfing,
        Pattern::BearishEngulfing,
        Pattern::MorningStar,
        Pattern::EveningStar,
        Pattern::DragonflyDoji,
        Pattern::GravestoneDoji,
        Pattern::LongLeggedDoji,
        Pattern::Doji,
    ];

    /// Human-readable name, identical to the serialized form
    pub fn as_str(&self) -> &'static str {
        match self {
            Pattern::Hammer => "Hammer",
            Pattern::BullishEngulfing => "Bullish Engulfing",
            Pattern::BearishEngulfing => "Bearish Engulfing",
            Pattern::MorningStar => "Morning Star",
            Pattern::EveningStar => "Evening Star",
            Pattern::DragonflyDoji => "Dragonfly Doji",
            Pattern::GravestoneDoji => "Gravestone Doji",
            Pattern::LongLeggedDoji => "Long-Legged Doji",
            Pattern::Doji => "Doji",
        }
    }

    /// Returns the direction this pattern signals.
    pub fn typical_direction(&self) -> Direction {
        match self {
            Pattern::Hammer
            | Pattern::BullishEngulfing
            | Pattern::MorningStar
            | Pattern::DragonflyDoji => Direction::Bullish,
            Pattern::BearishEngulfing | Pattern::EveningStar | Pattern::GravestoneDoji => {
                Direction::Bearish
            }
            Pattern::LongLeggedDoji | Pattern::Doji => Direction::Neutral,
        }
    }

    /// Trade direction emitted when this pattern wins selection
    pub fn signal_type(&self) -> SignalType {
        self.typical_direction().into()
    }

    /// Number of bars the formation spans
    pub fn bar_count(&self) -> usize {
        match self {
            Pattern::BullishEngulfing | Pattern::BearishEngulfing => 2,
            Pattern::MorningStar | Pattern::EveningStar => 3,
            _ => 1,
        }
    }
}

impl std::fmt::Display for Pattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction/bias of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    Bullish,
    Neutral,
    Bearish,
}

/// Result of evaluating one rule against a bar window - Copy, no allocations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PatternMatch {
    pub pattern: Pattern,
    pub matched: bool,
    /// Confidence score 0.0..=1.0, always 0.0 when not matched
    pub confidence: f64,
}

impl PatternMatch {
    #[inline]
    pub fn hit(pattern: Pattern, confidence: Ratio) -> Self {
        Self {
            pattern,
            matched: true,
            confidence: confidence.get(),
        }
    }

    #[inline]
    pub fn miss(pattern: Pattern) -> Self {
        Self {
            pattern,
            matched: false,
            confidence: 0.0,
        }
    }

    #[inline]
    pub fn signal_type(&self) -> SignalType {
        self.pattern.signal_type()
    }
}

// ============================================================
// PATTERN RULE TRAIT
// ============================================================

/// A pure candlestick rule.
///
/// Rules look only at the tail of `bars` (most recent last) and return a
/// non-match when fewer than [`min_bars`](PatternRule::min_bars) are supplied.
pub trait PatternRule: Send + Sync {
    /// Configuration key of the rule (e.g. `"hammer"`)
    fn name(&self) -> &'static str;

    /// Pattern reported on a non-match
    fn pattern(&self) -> Pattern;

    fn min_bars(&self) -> usize;

    fn evaluate<T: OHLCV>(&self, bars: &[T]) -> PatternMatch;

    fn validate_config(&self) -> Result<()> {
        Ok(())
    }
}

// ============================================================
// BUILTIN RULES - generated via macro
// ============================================================

use detectors::*;

/// Macro to generate BuiltinRule enum without boilerplate
macro_rules! define_builtin_rules {
    (
        $(
            $variant:ident($rule:ty) = $name:literal
        ),* $(,)?
    ) => {
        /// All builtin rules - enum dispatch, evaluated in declaration order
        #[derive(Debug, Clone)]
        pub enum BuiltinRule {
            $($variant($rule)),*
        }

        impl BuiltinRule {
            /// Configuration keys in evaluation order
            pub const NAMES: &'static [&'static str] = &[$($name),*];

            /// Every builtin rule with default thresholds, in evaluation order
            pub fn defaults() -> Vec<BuiltinRule> {
                vec![$(Self::$variant(<$rule>::default())),*]
            }

            /// Build a rule by configuration key, overriding the given parameters
            pub fn from_params(
                name: &str,
                params: &std::collections::HashMap<&str, f64>,
            ) -> Result<Self> {
                use crate::params::ParameterizedRule;
                match name {
                    $($name => {
                        crate::params::check_params(params, <$rule>::param_meta())?;
                        Ok(Self::$variant(<$rule>::with_params(params)?))
                    })*
                    other => Err(PatternError::InvalidConfig(format!("unknown rule `{other}`"))),
                }
            }

            #[inline]
            pub fn evaluate<T: OHLCV>(&self, bars: &[T]) -> PatternMatch {
                match self {
                    $(Self::$variant(r) => PatternRule::evaluate(r, bars)),*
                }
            }

            #[inline]
            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$variant(r) => PatternRule::name(r)),*
                }
            }

            #[inline]
            pub fn pattern(&self) -> Pattern {
                match self {
                    $(Self::$variant(r) => PatternRule::pattern(r)),*
                }
            }

            #[inline]
            pub fn min_bars(&self) -> usize {
                match self {
                    $(Self::$variant(r) => PatternRule::min_bars(r)),*
                }
            }

            pub fn validate_config(&self) -> Result<()> {
                match self {
                    $(Self::$variant(r) => PatternRule::validate_config(r)),*
                }
            }
        }
    };
}

define_builtin_rules! {
    Hammer(HammerRule) = "hammer",
    BullishEngulfing(BullishEngulfingRule) = "bullish_engulfing",
    BearishEngulfing(BearishEngulfingRule) = "bearish_engulfing",
    MorningStar(MorningStarRule) = "morning_star",
    EveningStar(EveningStarRule) = "evening_star",
    Doji(DojiRule) = "doji",
}

// ============================================================
// TESTS
// ============================================================
