//! ATR (Average True Range) indicator

use crate::data::Candle;
use ta::indicators::SimpleMovingAverage;
use ta::Next;

/// Value returned when there is not enough history for an ATR
pub const DEFAULT_ATR: f64 = 1.0;

/// Default ATR lookback
pub const ATR_PERIOD: usize = 14;

/// True range of a candle relative to the previous close
pub fn true_range(candle: &Candle, prev_close: f64) -> f64 {
    (candle.high - candle.low)
        .max((candle.high - prev_close).abs())
        .max((candle.low - prev_close).abs())
}

/// Simple mean of the last `period` true ranges.
///
/// Returns [`DEFAULT_ATR`] with fewer than `period + 1` candles.
pub fn calculate_atr(candles: &[Candle], period: usize) -> f64 {
    if period == 0 || candles.len() < period + 1 {
        return DEFAULT_ATR;
    }
    let Ok(mut sma) = SimpleMovingAverage::new(period) else {
        return DEFAULT_ATR;
    };

    let start = candles.len() - period;
    let mut atr = DEFAULT_ATR;
    for i in start..candles.len() {
        atr = sma.next(true_range(&candles[i], candles[i - 1].close));
    }
    atr
}
