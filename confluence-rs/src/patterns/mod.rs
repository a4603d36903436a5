//! Candlestick pattern recognition
//!
//! A fixed catalog of single, two and three candle formations. Each hit is
//! scored from a base weight plus reversal and volume bonuses.

pub mod detector;
pub mod kind;

pub use detector::*;
pub use kind::*;
