//! Fibonacci retracement levels

use crate::data::Candle;
use serde::{Deserialize, Serialize};

/// Standard retracement ratios, measured from the high downward
pub const FIBONACCI_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevel {
    pub ratio: f64,
    pub price: f64,
}

/// Retracement levels between a swing high and low
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FibonacciLevels {
    pub high: f64,
    pub low: f64,
    pub levels: Vec<FibonacciLevel>,
}

impl FibonacciLevels {
    pub fn new(high: f64, low: f64) -> Self {
        let span = high - low;
        let levels = FIBONACCI_RATIOS
            .iter()
            .map(|&ratio| FibonacciLevel {
                ratio,
                price: high - span * ratio,
            })
            .collect();
        Self { high, low, levels }
    }

    /// Levels spanning the highest high and lowest low of the candles
    pub fn from_candles(candles: &[Candle]) -> Option<Self> {
        let high = candles.iter().map(|c| c.high).reduce(f64::max)?;
        let low = candles.iter().map(|c| c.low).reduce(f64::min)?;
        Some(Self::new(high, low))
    }

    /// Price of the level with the given ratio
    pub fn price_at(&self, ratio: f64) -> Option<f64> {
        self.levels
            .iter()
            .find(|l| (l.ratio - ratio).abs() < f64::EPSILON)
            .map(|l| l.price)
    }

    /// Level closest to `price`
    pub fn nearest(&self, price: f64) -> Option<FibonacciLevel> {
        self.levels
            .iter()
            .copied()
            .min_by(|a, b| (a.price - price).abs().total_cmp(&(b.price - price).abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels() {
        let fib = FibonacciLevels::new(200.0, 100.0);
        assert_eq!(fib.levels.len(), 7);
        assert_eq!(fib.price_at(0.0), Some(200.0));
        assert_eq!(fib.price_at(0.5), Some(150.0));
        assert_eq!(fib.price_at(1.0), Some(100.0));
        assert!((fib.price_at(0.618).unwrap() - 138.2).abs() < 1e-9);
    }

    #[test]
    fn test_nearest() {
        let fib = FibonacciLevels::new(200.0, 100.0);
        let level = fib.nearest(149.0).unwrap();
        assert_eq!(level.ratio, 0.5);
    }

    #[test]
    fn test_from_candles_empty() {
        assert!(FibonacciLevels::from_candles(&[]).is_none());
    }
}
