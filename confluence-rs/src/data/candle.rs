//! OHLCV candle data structures

use crate::error::InvalidCandleSeriesError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV candle data
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Open time in epoch milliseconds
    pub time: i64,
    /// Opening price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Closing price
    pub close: f64,
    /// Volume
    pub volume: f64,
}

impl Candle {
    /// Create a new candle
    pub fn new(time: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            time,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Open time as a UTC datetime, `None` when out of chrono's range
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.time)
    }

    /// Get typical price (HLC/3)
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Get median price (HL/2)
    pub fn median_price(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// Check if candle is bullish
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Check if candle is bearish
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Get body size (absolute difference between open and close)
    pub fn body_size(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Top of the real body
    pub fn body_top(&self) -> f64 {
        self.open.max(self.close)
    }

    /// Bottom of the real body
    pub fn body_bottom(&self) -> f64 {
        self.open.min(self.close)
    }

    /// Get upper wick size
    pub fn upper_wick(&self) -> f64 {
        self.high - self.body_top()
    }

    /// Get lower wick size
    pub fn lower_wick(&self) -> f64 {
        self.body_bottom() - self.low
    }

    /// Get total range (high - low)
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    fn check(&self, index: usize) -> Result<(), InvalidCandleSeriesError> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(InvalidCandleSeriesError::NonFinite { index, field });
            }
        }
        if self.high < self.low {
            return Err(InvalidCandleSeriesError::HighBelowLow {
                index,
                high: self.high,
                low: self.low,
            });
        }
        Ok(())
    }
}

/// Check that candles are finite, well-formed and strictly ascending in time.
pub fn validate_candles(candles: &[Candle]) -> Result<(), InvalidCandleSeriesError> {
    for (index, candle) in candles.iter().enumerate() {
        candle.check(index)?;
        if index > 0 {
            let previous = candles[index - 1].time;
            if candle.time <= previous {
                return Err(InvalidCandleSeriesError::OutOfOrder {
                    index,
                    previous,
                    current: candle.time,
                });
            }
        }
    }
    Ok(())
}

/// Validated collection of candles, oldest first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CandleSeries {
    candles: Vec<Candle>,
}

impl CandleSeries {
    /// Validate and wrap a vector of candles
    pub fn new(candles: Vec<Candle>) -> Result<Self, InvalidCandleSeriesError> {
        validate_candles(&candles)?;
        Ok(Self { candles })
    }

    /// Append a candle, rejecting it if it breaks ordering or finiteness
    pub fn push(&mut self, candle: Candle) -> Result<(), InvalidCandleSeriesError> {
        let index = self.candles.len();
        candle.check(index)?;
        if let Some(last) = self.candles.last() {
            if candle.time <= last.time {
                return Err(InvalidCandleSeriesError::OutOfOrder {
                    index,
                    previous: last.time,
                    current: candle.time,
                });
            }
        }
        self.candles.push(candle);
        Ok(())
    }

    /// Get number of candles
    pub fn len(&self) -> usize {
        self.candles.len()
    }

    /// Check if series is empty
    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    /// Get last candle
    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    /// Get all candles
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// Get close prices as vector
    pub fn closes(&self) -> Vec<f64> {
        closes(&self.candles)
    }

    /// Consume the series
    pub fn into_inner(self) -> Vec<Candle> {
        self.candles
    }
}

impl TryFrom<Vec<Candle>> for CandleSeries {
    type Error = InvalidCandleSeriesError;

    fn try_from(candles: Vec<Candle>) -> Result<Self, Self::Error> {
        Self::new(candles)
    }
}

impl AsRef<[Candle]> for CandleSeries {
    fn as_ref(&self) -> &[Candle] {
        &self.candles
    }
}

/// Close prices of a candle slice
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(time: i64, close: f64) -> Candle {
        Candle::new(time, close, close + 1.0, close - 1.0, close, 10.0)
    }

    #[test]
    fn test_candle_geometry() {
        let c = Candle::new(0, 100.0, 110.0, 95.0, 105.0, 1000.0);
        assert!(c.is_bullish());
        assert_eq!(c.body_size(), 5.0);
        assert_eq!(c.upper_wick(), 5.0);
        assert_eq!(c.lower_wick(), 5.0);
        assert_eq!(c.range(), 15.0);
        assert_eq!(c.median_price(), 102.5);
    }

    #[test]
    fn test_datetime() {
        let c = candle(1_700_000_000_000, 1.0);
        assert_eq!(c.datetime().unwrap().timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_series_rejects_out_of_order() {
        let err = CandleSeries::new(vec![candle(2, 1.0), candle(1, 1.0)]).unwrap_err();
        assert_eq!(
            err,
            InvalidCandleSeriesError::OutOfOrder {
                index: 1,
                previous: 2,
                current: 1
            }
        );
    }

    #[test]
    fn test_series_rejects_duplicate_time() {
        assert!(CandleSeries::new(vec![candle(5, 1.0), candle(5, 2.0)]).is_err());
    }

    #[test]
    fn test_series_rejects_nan() {
        let mut bad = candle(1, 1.0);
        bad.close = f64::NAN;
        let err = CandleSeries::new(vec![candle(0, 1.0), bad]).unwrap_err();
        assert_eq!(
            err,
            InvalidCandleSeriesError::NonFinite {
                index: 1,
                field: "close"
            }
        );
    }

    #[test]
    fn test_series_rejects_inverted_range() {
        let bad = Candle::new(0, 1.0, 0.5, 2.0, 1.0, 1.0);
        assert!(matches!(
            validate_candles(&[bad]),
            Err(InvalidCandleSeriesError::HighBelowLow { index: 0, .. })
        ));
    }

    #[test]
    fn test_series_push() {
        let mut series = CandleSeries::default();
        series.push(candle(1, 1.0)).unwrap();
        series.push(candle(2, 2.0)).unwrap();
        assert!(series.push(candle(2, 3.0)).is_err());
        assert_eq!(series.len(), 2);
        assert_eq!(series.closes(), vec![1.0, 2.0]);
    }
}
