//! Confluence-RS: multi-timeframe technical analysis for leveraged trading
//!
//! This crate turns OHLCV candle series into trading decisions and replays a
//! rule-based strategy over history:
//! - [ta](https://github.com/greyblake/ta-rs) backs the rolling statistics
//! - [rayon](https://github.com/rayon-rs/rayon) runs independent timeframes in parallel
//!
//! # Features
//!
//! - **Data**: OHLCV candles and validated candle series
//! - **Technical Indicators**: RSI, EMA, ATR, Fibonacci, volume profile,
//!   divergence, market structure, trap detection
//! - **Candlestick Patterns**: reversal/continuation catalog with significance scoring
//! - **Analysis**: per-timeframe confidence scoring
//! - **Decision Engine**: weighted multi-timeframe fusion with leverage and SL/TP
//! - **DCA**: pyramiding entry ladders
//! - **Backtesting**: RSI/EMA simulator with performance metrics
//!
//! # Example
//!
//! ```no_run
//! use confluence_rs::prelude::*;
//! use std::collections::BTreeMap;
//!
//! fn decide(hourly: &[Candle], daily: &[Candle]) -> TradingDecision {
//!     let mut analyses = BTreeMap::new();
//!     analyses.insert("1h".to_string(), compute_timeframe_analysis(hourly, "1h"));
//!     analyses.insert("1d".to_string(), compute_timeframe_analysis(daily, "1d"));
//!     let price = hourly.last().map(|c| c.close).unwrap_or_default();
//!     fuse_decision(&analyses, price, 1, 15)
//! }
//! ```

pub mod analysis;
pub mod backtest;
pub mod config;
pub mod data;
pub mod dca;
pub mod decision;
pub mod error;
pub mod indicators;
pub mod patterns;
pub mod types;

// Re-export commonly used types
pub mod prelude {
    pub use crate::analysis::*;
    pub use crate::backtest::*;
    pub use crate::config::*;
    pub use crate::data::*;
    pub use crate::dca::*;
    pub use crate::decision::*;
    pub use crate::error::*;
    pub use crate::indicators::*;
    pub use crate::patterns::*;
    pub use crate::types::*;

    pub use anyhow::{Context, Result};
}

/// Result type alias
pub type Result<T> = anyhow::Result<T>;
