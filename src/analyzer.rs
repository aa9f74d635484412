//! Signal selection
//!
//! [`SignalAnalyzer`] runs its rules over the tail of a bar sequence, picks
//! the highest-confidence match and records every emitted signal in its
//! [`SignalHistory`].

use std::path::Path;

use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::{
    config::AnalyzerSettings,
    history::SignalHistory,
    signal::{REASON_INSUFFICIENT_DATA, REASON_NO_PATTERN},
    BuiltinRule, OHLCVExt, Pattern, PatternError, PatternMatch, Ratio, Result, Signal, OHLCV,
};

// ============================================================
// CONFIG
// ============================================================

/// Pair used when none is configured
pub const DEFAULT_PAIR: &str = "UNKNOWN";

/// Analyzer runtime configuration
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Instrument identifier stamped on every signal
    pub pair: String,
    pub min_confidence: Option<f64>,
    /// Reject malformed bars in the evaluation window
    pub validate_data: bool,
    pub pattern_filter: Option<Vec<Pattern>>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            pair: DEFAULT_PAIR.to_string(),
            min_confidence: None,
            validate_data: true,
            pattern_filter: None,
        }
    }
}

// ============================================================
// SELECTION
// ============================================================

/// Highest-confidence matched entry. Ties go to the earliest entry.
pub fn select_best(matches: &[PatternMatch]) -> Option<PatternMatch> {
    matches
        .iter()
        .filter(|m| m.matched)
        .fold(None, |best: Option<PatternMatch>, m| match best {
            Some(b) if b.confidence >= m.confidence => Some(b),
            _ => Some(*m),
        })
}

// ============================================================
// ANALYZER
// ============================================================

/// Candlestick signal analyzer
#[derive(Debug, Clone)]
pub struct SignalAnalyzer {
    rules: Vec<BuiltinRule>,
    config: AnalyzerConfig,
    history: SignalHistory,
}

impl Default for SignalAnalyzer {
    fn default() -> Self {
        Self {
            rules: BuiltinRule::defaults(),
            config: AnalyzerConfig::default(),
            history: SignalHistory::new(),
        }
    }
}

impl SignalAnalyzer {
    /// Analyzer with every builtin rule and default configuration
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    #[inline]
    pub fn pair(&self) -> &str {
        &self.config.pair
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn rules(&self) -> &[BuiltinRule] {
        &self.rules
    }

    pub fn history(&self) -> &SignalHistory {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    /// Hand the accumulated history over, leaving an empty one behind
    pub fn take_history(&mut self) -> SignalHistory {
        std::mem::take(&mut self.history)
    }

    /// Export the accumulated history to a JSON file
    pub fn export_history(&self, path: &Path) -> Result<()> {
        self.history.export_json(path)
    }

    /// Number of trailing bars the configured rules look at
    pub fn window_len(&self) -> usize {
        self.rules.iter().map(|r| r.min_bars()).max().unwrap_or(1)
    }

    // ===========================================
    // Evaluation
    // ===========================================

    /// Every rule that matches the tail of `bars`, in evaluation order
    pub fn matches<T: OHLCV>(&self, bars: &[T]) -> Vec<PatternMatch> {
        self.rules
            .iter()
            .map(|rule| rule.evaluate(bars))
            .filter(|m| m.matched && self.should_include(m))
            .inspect(|m| trace!(pattern = %m.pattern, confidence = m.confidence, "rule matched"))
            .collect()
    }

    /// Evaluate `bars` for the configured pair without touching the history
    pub fn evaluate<T: OHLCV>(&self, bars: &[T]) -> Signal {
        self.evaluate_for(&self.config.pair, bars)
    }

    /// Evaluate `bars` for an explicit pair without touching the history
    pub fn evaluate_for<T: OHLCV>(&self, pair: &str, bars: &[T]) -> Signal {
        let Some(latest) = bars.last() else {
            return Signal::none::<T>(pair, None, REASON_INSUFFICIENT_DATA);
        };

        let start = bars.len().saturating_sub(self.window_len());
        let window = &bars[start..];

        if self.config.validate_data {
            if let Err(e) = validate_window(window, start) {
                warn!(pair, error = %e, "malformed candle data");
                return Signal::none(pair, Some(latest), format!("Malformed candle data: {e}"));
            }
        }

        let matches = self.matches(window);
        match select_best(&matches) {
            Some(best) => {
                debug!(
                    pair,
                    pattern = %best.pattern,
                    signal = %best.signal_type(),
                    confidence = best.confidence,
                    candidates = matches.len(),
                    "pattern selected"
                );
                Signal::from_match(pair, &best, latest)
            }
            None => Signal::none(pair, Some(latest), REASON_NO_PATTERN),
        }
    }

    /// Evaluate `bars` and record the result in the history when a pattern matched
    pub fn analyze<T: OHLCV>(&mut self, bars: &[T]) -> Signal {
        let signal = self.evaluate(bars);
        if signal.is_signal() {
            self.history.push(signal.clone());
        }
        signal
    }

    /// Rolling evaluation: the signal at each bar whose trailing window matched
    pub fn scan<T: OHLCV>(&self, bars: &[T]) -> Vec<(usize, Signal)> {
        (0..bars.len())
            .filter_map(|i| {
                let signal = self.evaluate(&bars[..=i]);
                signal.is_signal().then_some((i, signal))
            })
            .collect()
    }

    // ===========================================
    // Internal helpers
    // ===========================================

    fn should_include(&self, m: &PatternMatch) -> bool {
        if let Some(min) = self.config.min_confidence {
            if m.confidence < min {
                return false;
            }
        }
        if let Some(ref filter) = self.config.pattern_filter {
            if !filter.contains(&m.pattern) {
                return false;
            }
        }
        true
    }

    fn validate(&self) -> Result<()> {
        for rule in &self.rules {
            rule.validate_config()?;
        }
        if let Some(min) = self.config.min_confidence {
            Ratio::new(min)?;
        }
        if self.config.pair.trim().is_empty() {
            return Err(PatternError::InvalidConfig("pair must not be empty".into()));
        }
        Ok(())
    }
}

fn validate_window<T: OHLCV>(window: &[T], offset: usize) -> Result<()> {
    for (i, bar) in window.iter().enumerate() {
        bar.validate().map_err(|e| match e {
            PatternError::InvalidOHLCV { reason, .. } => PatternError::InvalidOHLCV {
                index: offset + i,
                reason,
            },
            other => other,
        })?;
    }
    Ok(())
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating SignalAnalyzer instances
#[derive(Debug, Clone, Default)]
pub struct AnalyzerBuilder {
    rules: Vec<BuiltinRule>,
    config: AnalyzerConfig,
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pre-populated from file-based settings
    pub fn from_config(settings: &AnalyzerSettings) -> Result<Self> {
        settings.builder()
    }

    /// Add every builtin rule with default thresholds, in the standard order
    pub fn with_all_defaults(mut self) -> Self {
        self.rules.extend(BuiltinRule::defaults());
        self
    }

    /// Add a builtin rule. Rules are evaluated in insertion order.
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, rule: BuiltinRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add with config validation
    pub fn add_checked(mut self, rule: BuiltinRule) -> Result<Self> {
        rule.validate_config()?;
        self.rules.push(rule);
        Ok(self)
    }

    pub fn pair(mut self, pair: impl Into<String>) -> Self {
        self.config.pair = pair.into();
        self
    }

    /// Drop matches below this confidence before selection
    pub fn min_confidence(mut self, confidence: f64) -> Self {
        self.config.min_confidence = Some(confidence);
        self
    }

    /// Enable/disable data validation
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.config.validate_data = enable;
        self
    }

    /// Filter to specific patterns only
    pub fn only_patterns(mut self, patterns: impl IntoIterator<Item = Pattern>) -> Self {
        self.config.pattern_filter = Some(patterns.into_iter().collect());
        self
    }

    /// Build the analyzer
    pub fn build(self) -> Result<SignalAnalyzer> {
        let analyzer = SignalAnalyzer {
            rules: self.rules,
            config: self.config,
            history: SignalHistory::new(),
        };
        analyzer.validate()?;
        Ok(analyzer)
    }
}

// ============================================================
// PARALLEL EVALUATION
// ============================================================

/// Evaluate many instruments in parallel. Results follow input order.
///
/// Uses [`SignalAnalyzer::evaluate_for`], so the analyzer's history is left
/// untouched.
pub fn analyze_parallel<'a, T, I>(analyzer: &SignalAnalyzer, instruments: I) -> Vec<Signal>
where
    T: OHLCV + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    instruments
        .into_par_iter()
        .map(|(pair, bars)| analyzer.evaluate_for(pair, bars))
        .collect()
}

// ============================================================
// TESTS
// ============================================================
