//! Candlestick pattern rules
//!
//! Each rule is a pure function of the most recent bars and reports a
//! [`PatternMatch`](crate::PatternMatch) with a fixed per-pattern confidence.
//!
//! # Pattern Categories
//!
//! - **Single-bar**: Hammer, Doji family (Dragonfly, Gravestone, Long-Legged, plain Doji)
//! - **Two-bar**: Bullish Engulfing, Bearish Engulfing
//! - **Three-bar**: Morning Star, Evening Star

pub mod helpers;

/// Generate `with_defaults()` -> `Self::default()` for multiple rule types.
macro_rules! impl_with_defaults {
  ($($rule:ty),* $(,)?) => {
    $(impl $rule {
      pub fn with_defaults() -> Self { Self::default() }
    })*
  };
}

pub mod single_bar;
pub mod three_bar;
pub mod two_bar;

// Re-export all rules for convenience
pub use helpers::*;
pub use single_bar::*;
pub use three_bar::*;
pub use two_bar::*;
