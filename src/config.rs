//! File-based analyzer configuration
//!
//! ```toml
//! pair = "BTC/USD"
//! min_confidence = 0.6
//! enabled_rules = ["hammer", "doji"]
//!
//! [rules.hammer]
//! lower_shadow_factor = 2.5
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use serde::Deserialize;

use crate::{
    analyzer::{AnalyzerBuilder, SignalAnalyzer, DEFAULT_PAIR},
    BuiltinRule, Pattern, PatternError, Result,
};

/// Analyzer settings as read from TOML. Every field is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerSettings {
    pub pair: String,
    pub validate_data: bool,
    pub min_confidence: Option<f64>,
    /// Only report these patterns
    pub patterns: Option<Vec<Pattern>>,
    /// Rules to run, by configuration key. All builtin rules when absent.
    /// Evaluation order stays the builtin order regardless of listing order.
    pub enabled_rules: Option<Vec<String>>,
    /// Parameter overrides: rule key -> parameter name -> value
    pub rules: BTreeMap<String, BTreeMap<String, f64>>,
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        Self {
            pair: DEFAULT_PAIR.to_string(),
            validate_data: true,
            min_confidence: None,
            patterns: None,
            enabled_rules: None,
            rules: BTreeMap::new(),
        }
    }
}

impl AnalyzerSettings {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&content)?;
        tracing::info!(path = %path.display(), pair = %settings.pair, "loaded analyzer settings");
        Ok(settings)
    }

    /// Builder pre-populated from these settings
    pub fn builder(&self) -> Result<AnalyzerBuilder> {
        for name in self.rules.keys() {
            if !BuiltinRule::NAMES.contains(&name.as_str()) {
                return Err(PatternError::InvalidConfig(format!(
                    "parameters given for unknown rule `{name}`"
                )));
            }
        }
        if let Some(enabled) = &self.enabled_rules {
            for name in enabled {
                if !BuiltinRule::NAMES.contains(&name.as_str()) {
                    return Err(PatternError::InvalidConfig(format!("unknown rule `{name}`")));
                }
            }
        }

        let mut builder = AnalyzerBuilder::new()
            .pair(self.pair.clone())
            .validate_data(self.validate_data);

        for &name in BuiltinRule::NAMES {
            let enabled = self
                .enabled_rules
                .as_ref()
                .map_or(true, |list| list.iter().any(|n| n == name));
            if !enabled {
                continue;
            }
            let params: HashMap<&str, f64> = self
                .rules
                .get(name)
                .map(|p| p.iter().map(|(k, v)| (k.as_str(), *v)).collect())
                .unwrap_or_default();
            builder = builder.add_checked(BuiltinRule::from_params(name, &params)?)?;
        }

        if let Some(min) = self.min_confidence {
            builder = builder.min_confidence(min);
        }
        if let Some(patterns) = &self.patterns {
            builder = builder.only_patterns(patterns.iter().copied());
        }
        Ok(builder)
    }

    pub fn build(&self) -> Result<SignalAnalyzer> {
        self.builder()?.build()
    }
}
