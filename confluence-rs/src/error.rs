//! Error types

use thiserror::Error;

/// Rejected candle input, raised at the ingestion boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidCandleSeriesError {
    #[error("candle {index}: {field} is not a finite number")]
    NonFinite { index: usize, field: &'static str },

    #[error("candle {index}: high ({high}) is below low ({low})")]
    HighBelowLow { index: usize, high: f64, low: f64 },

    #[error("candle {index}: time {current} does not follow previous time {previous}")]
    OutOfOrder {
        index: usize,
        previous: i64,
        current: i64,
    },
}

/// Backtest failures.
#[derive(Debug, Error)]
pub enum BacktestError {
    #[error("invalid candle series: {0}")]
    InvalidSeries(#[from] InvalidCandleSeriesError),

    #[error("backtest cancelled after {processed} candles")]
    Cancelled { processed: usize },
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("unknown fusion profile: {0}")]
    UnknownProfile(String),

    #[error("leverage bounds inverted: min {min} > max {max}")]
    LeverageBounds { min: u32, max: u32 },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
