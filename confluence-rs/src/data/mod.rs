//! Data module
//!
//! OHLCV candles and validation of candle series at the ingestion boundary.

pub mod candle;

pub use candle::*;
