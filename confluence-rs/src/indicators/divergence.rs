//! Price/RSI divergence

use crate::data::Candle;
use serde::{Deserialize, Serialize};

/// Number of trailing candles compared
pub const DIVERGENCE_WINDOW: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Divergence {
    /// Price falling while RSI rises
    pub bullish: bool,
    /// Price rising while RSI falls
    pub bearish: bool,
    /// 0..=100
    pub strength: f64,
}

impl Divergence {
    pub fn is_present(&self) -> bool {
        self.bullish || self.bearish
    }
}

/// Compare price and RSI direction over the last [`DIVERGENCE_WINDOW`] candles.
///
/// `rsi` must be aligned with `candles` (as returned by
/// [`calculate_rsi`](crate::indicators::calculate_rsi)). Strength is
/// `5 * |price change %| + |RSI change|`, capped at 100.
pub fn detect_divergence(candles: &[Candle], rsi: &[Option<f64>]) -> Divergence {
    let n = candles.len();
    if n < DIVERGENCE_WINDOW || rsi.len() != n {
        return Divergence::default();
    }
    let first = n - DIVERGENCE_WINDOW;
    let (Some(rsi_first), Some(rsi_last)) = (rsi[first], rsi[n - 1]) else {
        return Divergence::default();
    };

    let price_first = candles[first].close;
    let price_change = candles[n - 1].close - price_first;
    let rsi_change = rsi_last - rsi_first;

    let bullish = price_change < 0.0 && rsi_change > 0.0;
    let bearish = price_change > 0.0 && rsi_change < 0.0;
    if !bullish && !bearish {
        return Divergence::default();
    }

    let price_pct = if price_first != 0.0 {
        (price_change / price_first * 100.0).abs()
    } else {
        0.0
    };
    let strength = (price_pct * 5.0 + rsi_change.abs()).clamp(0.0, 100.0);

    Divergence {
        bullish,
        bearish,
        strength,
    }
}
