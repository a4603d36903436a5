//! RSI (Relative Strength Index) indicator with Wilder smoothing

use crate::indicators::{run_series, Indicator};

/// Default RSI lookback
pub const RSI_PERIOD: usize = 14;

/// RSI indicator
///
/// Averages are seeded with the simple mean of the first `period` gains and
/// losses, then smoothed with `avg = (avg * (period - 1) + x) / period`.
#[derive(Debug, Clone)]
pub struct RSI {
    period: usize,
    prev_close: Option<f64>,
    deltas: usize,
    gain_sum: f64,
    loss_sum: f64,
    avg_gain: f64,
    avg_loss: f64,
    last_value: Option<f64>,
}

impl RSI {
    /// Create new RSI indicator
    pub fn new(period: usize) -> Self {
        Self {
            period,
            prev_close: None,
            deltas: 0,
            gain_sum: 0.0,
            loss_sum: 0.0,
            avg_gain: 0.0,
            avg_loss: 0.0,
            last_value: None,
        }
    }

    /// Get RSI period
    pub fn period(&self) -> usize {
        self.period
    }

    fn from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
        if avg_loss == 0.0 {
            // flat window reads as neutral, pure gains as maximum strength
            if avg_gain == 0.0 {
                50.0
            } else {
                100.0
            }
        } else {
            100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
        }
    }
}

impl Indicator for RSI {
    fn name(&self) -> &str {
        "RSI"
    }

    fn update(&mut self, value: f64) {
        if self.period == 0 {
            return;
        }
        if let Some(prev) = self.prev_close {
            let change = value - prev;
            let gain = change.max(0.0);
            let loss = (-change).max(0.0);
            self.deltas += 1;

            let period = self.period as f64;
            if self.deltas <= self.period {
                self.gain_sum += gain;
                self.loss_sum += loss;
                if self.deltas == self.period {
                    self.avg_gain = self.gain_sum / period;
                    self.avg_loss = self.loss_sum / period;
                    self.last_value = Some(Self::from_averages(self.avg_gain, self.avg_loss));
                }
            } else {
                self.avg_gain = (self.avg_gain * (period - 1.0) + gain) / period;
                self.avg_loss = (self.avg_loss * (period - 1.0) + loss) / period;
                self.last_value = Some(Self::from_averages(self.avg_gain, self.avg_loss));
            }
        }
        self.prev_close = Some(value);
    }

    fn value(&self) -> Option<f64> {
        self.last_value
    }

    fn is_ready(&self) -> bool {
        self.last_value.is_some()
    }
}

/// Calculate RSI from a series of values.
///
/// The output is aligned with the input; the first `period` entries are `None`.
pub fn calculate_rsi(values: &[f64], period: usize) -> Vec<Option<f64>> {
    run_series(RSI::new(period), values)
}

/// Last defined RSI value of a series
pub fn latest_rsi(values: &[f64], period: usize) -> Option<f64> {
    let mut rsi = RSI::new(period);
    for &value in values {
        rsi.update(value);
    }
    rsi.value()
}
