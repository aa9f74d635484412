//! Trading signal emitted by the analyzer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Direction, Pattern, PatternMatch, OHLCV};

/// Reason attached to an empty-window signal
pub const REASON_INSUFFICIENT_DATA: &str = "Insufficient candle data";
/// Reason attached when no rule matched
pub const REASON_NO_PATTERN: &str = "No patterns detected";

/// Trade direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalType {
    Buy,
    Sell,
    Hold,
}

impl SignalType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalType::Buy => "BUY",
            SignalType::Sell => "SELL",
            SignalType::Hold => "HOLD",
        }
    }
}

impl From<Direction> for SignalType {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Bullish => SignalType::Buy,
            Direction::Bearish => SignalType::Sell,
            Direction::Neutral => SignalType::Hold,
        }
    }
}

impl std::fmt::Display for SignalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one analysis call. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Timestamp of the most recent bar. Bars without one (and empty input)
    /// get the current time, so only signals from timestamped bars compare
    /// equal across calls.
    pub timestamp: DateTime<Utc>,
    pub pair: String,
    pub pattern: Option<Pattern>,
    #[serde(rename = "type")]
    pub signal_type: SignalType,
    pub confidence: f64,
    /// Close of the most recent bar
    pub price: f64,
    pub volume: f64,
    /// Why no pattern was reported; absent on real signals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl Signal {
    /// Signal built from the winning match and the most recent bar
    pub fn from_match<T: OHLCV>(pair: &str, m: &PatternMatch, latest: &T) -> Self {
        Self {
            timestamp: bar_time(latest),
            pair: pair.to_string(),
            pattern: Some(m.pattern),
            signal_type: m.signal_type(),
            confidence: m.confidence,
            price: latest.close(),
            volume: latest.volume(),
            reason: None,
        }
    }

    /// HOLD signal with zero confidence and an explanatory reason
    pub fn none<T: OHLCV>(pair: &str, latest: Option<&T>, reason: impl Into<String>) -> Self {
        Self {
            timestamp: latest.map(bar_time).unwrap_or_else(Utc::now),
            pair: pair.to_string(),
            pattern: None,
            signal_type: SignalType::Hold,
            confidence: 0.0,
            price: latest.map_or(0.0, |b| b.close()),
            volume: latest.map_or(0.0, |b| b.volume()),
            reason: Some(reason.into()),
        }
    }

    /// True if a pattern was detected
    #[inline]
    pub fn is_signal(&self) -> bool {
        self.pattern.is_some()
    }
}

/// Bar timestamp if it carries a valid one, otherwise the current time
fn bar_time<T: OHLCV>(bar: &T) -> DateTime<Utc> {
    bar.timestamp()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .unwrap_or_else(Utc::now)
}
