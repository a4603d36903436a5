//! EMA (Exponential Moving Average) indicator

use crate::indicators::{run_series, Indicator};

/// EMA indicator seeded with the simple average of its first `period` inputs
#[derive(Debug, Clone)]
pub struct EMA {
    period: usize,
    multiplier: f64,
    update_count: usize,
    seed_sum: f64,
    last_value: Option<f64>,
}

impl EMA {
    /// Create new EMA indicator
    pub fn new(period: usize) -> Self {
        Self {
            period,
            multiplier: 2.0 / (period as f64 + 1.0),
            update_count: 0,
            seed_sum: 0.0,
            last_value: None,
        }
    }

    /// Get EMA period
    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for EMA {
    fn name(&self) -> &str {
        "EMA"
    }

    fn update(&mut self, value: f64) {
        if self.period == 0 {
            return;
        }
        self.update_count += 1;
        match self.last_value {
            Some(prev) => {
                self.last_value = Some((value - prev) * self.multiplier + prev);
            }
            None => {
                self.seed_sum += value;
                if self.update_count == self.period {
                    self.last_value = Some(self.seed_sum / self.period as f64);
                }
            }
        }
    }

    fn value(&self) -> Option<f64> {
        self.last_value
    }

    fn is_ready(&self) -> bool {
        self.last_value.is_some()
    }
}

/// Calculate EMA from a series of values; indices before `period - 1` are `None`.
pub fn calculate_ema(values: &[f64], period: usize) -> Vec<Option<f64>> {
    run_series(EMA::new(period), values)
}

/// Last defined EMA value of a series
pub fn latest_ema(values: &[f64], period: usize) -> Option<f64> {
    let mut ema = EMA::new(period);
    for &value in values {
        ema.update(value);
    }
    ema.value()
}
