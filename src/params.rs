//! Parameter metadata for pattern rules
//!
//! Every builtin rule exposes its thresholds and confidence as named
//! parameters, enabling:
//! - Overrides from configuration files
//! - Parameter documentation
//! - Grid search over thresholds
//!
//! # Example
//!
//! ```rust
//! use candle_signals::params::{ParamMeta, ParamType, ParameterizedRule};
//! use candle_signals::prelude::*;
//!
//! for param in HammerRule::param_meta() {
//!     println!("{}: {:?} (default: {})", param.name, param.param_type, param.default);
//! }
//! ```

use std::collections::HashMap;

use crate::{PatternError, Ratio, Result};

// ============================================================
// PARAMETER TYPES
// ============================================================

/// Type of parameter value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
  /// Ratio value in 0.0..=1.0 (shares of a body or range, confidences)
  Ratio,
  /// Positive multiplier that may exceed 1.0 (e.g. shadow-to-body factor 2.0)
  Factor,
}

/// Metadata for a single rule parameter
#[derive(Debug, Clone)]
pub struct ParamMeta {
  /// Parameter name (e.g., "lower_shadow_factor")
  pub name: &'static str,
  /// Parameter type (Ratio or Factor)
  pub param_type: ParamType,
  /// Default value
  pub default: f64,
  /// Accepted values: (min, max), inclusive
  pub range: (f64, f64),
  /// Human-readable description
  pub description: &'static str,
}

impl ParamMeta {
  /// Create a new ParamMeta for a Ratio parameter
  pub const fn ratio(
    name: &'static str,
    default: f64,
    range: (f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Ratio, default, range, description }
  }

  /// Create a new ParamMeta for a Factor parameter
  pub const fn factor(
    name: &'static str,
    default: f64,
    range: (f64, f64),
    description: &'static str,
  ) -> Self {
    Self { name, param_type: ParamType::Factor, default, range, description }
  }

  /// Validate a value for this parameter
  pub fn validate(&self, value: f64) -> Result<()> {
    let (min, max) = self.range;
    if !value.is_finite() {
      return Err(PatternError::InvalidValue("Parameter must be finite"));
    }
    if value < min || value > max {
      return Err(PatternError::OutOfRange { field: self.name, value, min, max });
    }
    match self.param_type {
      ParamType::Ratio => Ratio::new(value).map(|_| ()),
      ParamType::Factor => {
        if value < 0.0 {
          return Err(PatternError::InvalidValue("Factor must be non-negative"));
        }
        Ok(())
      },
    }
  }
}

// ============================================================
// PARAMETERIZED RULE TRAIT
// ============================================================

/// Trait for rules that support parameterization
pub trait ParameterizedRule: Sized {
  /// Returns metadata for all configurable parameters
  fn param_meta() -> &'static [ParamMeta];

  /// Creates a rule with parameters from a HashMap
  ///
  /// Missing parameters use their default values.
  fn with_params(params: &HashMap<&str, f64>) -> Result<Self>;
}

// ============================================================
// PARAMETER VALUE HELPERS
// ============================================================

/// Helper to get a Ratio from params with default fallback
pub fn get_ratio(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<Ratio> {
  let value = params.get(key).copied().unwrap_or(default);
  Ratio::new(value)
}

/// Helper to get a non-negative finite factor from params with default fallback
pub fn get_factor(params: &HashMap<&str, f64>, key: &str, default: f64) -> Result<f64> {
  let value = params.get(key).copied().unwrap_or(default);
  if !value.is_finite() || value < 0.0 {
    return Err(PatternError::OutOfRange { field: "factor", value, min: 0.0, max: f64::MAX });
  }
  Ok(value)
}

/// Check supplied parameters against the rule's metadata: every name must be
/// declared and every value must fall inside its declared range
pub fn check_params(params: &HashMap<&str, f64>, meta: &[ParamMeta]) -> Result<()> {
  for (key, value) in params {
    let Some(m) = meta.iter().find(|m| m.name == *key) else {
      return Err(PatternError::InvalidConfig(format!("unknown parameter `{key}`")));
    };
    m.validate(*value)?;
  }
  Ok(())
}

// ============================================================
// TESTS
// ============================================================
