//! Append-only signal history with JSON export
//!
//! The history lives in memory for the lifetime of its analyzer. Exporting
//! writes a pretty-printed JSON array; it is a convenience dump, not a
//! durable log.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::{Result, Signal, SignalType};

/// Signals emitted by an analyzer, in call order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SignalHistory {
    signals: Vec<Signal>,
}

/// Aggregate view over a history
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HistorySummary {
    pub total: usize,
    pub buys: usize,
    pub sells: usize,
    pub holds: usize,
    /// Count per pattern name
    pub by_pattern: BTreeMap<String, usize>,
    /// 0.0 when the history is empty
    pub average_confidence: f64,
}

impl SignalHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a signal. Only the owning analyzer records into a history.
    #[inline]
    pub(crate) fn push(&mut self, signal: Signal) {
        self.signals.push(signal);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.signals.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Signal> {
        self.signals.iter()
    }

    pub fn as_slice(&self) -> &[Signal] {
        &self.signals
    }

    pub fn last(&self) -> Option<&Signal> {
        self.signals.last()
    }

    pub fn clear(&mut self) {
        self.signals.clear();
    }

    pub fn summary(&self) -> HistorySummary {
        let mut summary = HistorySummary {
            total: self.signals.len(),
            ..HistorySummary::default()
        };

        let mut confidence_sum = 0.0;
        for signal in &self.signals {
            match signal.signal_type {
                SignalType::Buy => summary.buys += 1,
                SignalType::Sell => summary.sells += 1,
                SignalType::Hold => summary.holds += 1,
            }
            if let Some(pattern) = signal.pattern {
                *summary
                    .by_pattern
                    .entry(pattern.as_str().to_string())
                    .or_insert(0) += 1;
            }
            confidence_sum += signal.confidence;
        }
        if summary.total > 0 {
            summary.average_confidence = confidence_sum / summary.total as f64;
        }

        summary
    }

    /// Serialize the history as a pretty JSON array
    pub fn write_json<W: Write>(&self, writer: W) -> Result<()> {
        serde_json::to_writer_pretty(writer, &self.signals)?;
        Ok(())
    }

    /// Export the history to a JSON file, creating parent directories if needed
    pub fn export_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(&self.signals)?;
        std::fs::write(path, json)?;
        tracing::info!(path = %path.display(), signals = self.signals.len(), "exported signal history");
        Ok(())
    }

    /// Read back a history previously written by [`export_json`](Self::export_json)
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let signals: Vec<Signal> = serde_json::from_str(&content)?;
        tracing::info!(path = %path.display(), signals = signals.len(), "loaded signal history");
        Ok(Self { signals })
    }
}

impl<'a> IntoIterator for &'a SignalHistory {
    type Item = &'a Signal;
    type IntoIter = std::slice::Iter<'a, Signal>;

    fn into_iter(self) -> Self::IntoIter {
        self.signals.iter()
    }
}
