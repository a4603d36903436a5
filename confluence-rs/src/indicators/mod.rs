//! Technical indicators module
//!
//! Streaming indicators implement [`Indicator`]; window-based detectors are
//! plain functions over candle slices that fall back to neutral values when
//! the history is too short.

pub mod atr;
pub mod divergence;
pub mod ema;
pub mod fibonacci;
pub mod rsi;
pub mod structure;
pub mod traps;
pub mod volatility;
pub mod volume_profile;

pub use atr::*;
pub use divergence::*;
pub use ema::*;
pub use fibonacci::*;
pub use rsi::*;
pub use structure::*;
pub use traps::*;
pub use volatility::*;
pub use volume_profile::*;

/// Indicator trait for all indicators
pub trait Indicator {
    /// Get the name of the indicator
    fn name(&self) -> &str;

    /// Update indicator with new value
    fn update(&mut self, value: f64);

    /// Get current indicator value
    fn value(&self) -> Option<f64>;

    /// Check if indicator is ready (has enough data)
    fn is_ready(&self) -> bool;
}

/// Feed every value through a fresh indicator, collecting the value after each step.
pub(crate) fn run_series<I: Indicator>(mut indicator: I, values: &[f64]) -> Vec<Option<f64>> {
    values
        .iter()
        .map(|&value| {
            indicator.update(value);
            indicator.value()
        })
        .collect()
}
