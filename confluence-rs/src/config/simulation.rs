//! Backtest simulation configuration

use serde::{Deserialize, Serialize};

/// Backtest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Starting capital
    pub initial_capital: f64,
    /// Leverage applied to every trade's PnL
    pub leverage: f64,
    /// Position size as a percentage of current capital (e.g., 2.0 = 2%)
    pub risk_per_trade_pct: f64,
    /// Candles skipped before the first decision; the indicator window is `warmup + 1`
    pub warmup: usize,
    pub rsi_period: usize,
    pub ema_fast: usize,
    pub ema_slow: usize,
    /// RSI below this is oversold
    pub rsi_oversold: f64,
    /// RSI above this is overbought
    pub rsi_overbought: f64,
}

impl BacktestConfig {
    /// Trailing candles used for indicators at each step
    pub fn window(&self) -> usize {
        self.warmup + 1
    }
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            initial_capital: 10_000.0,
            leverage: 1.0,
            risk_per_trade_pct: 2.0,
            warmup: 50,
            rsi_period: 14,
            ema_fast: 8,
            ema_slow: 21,
            rsi_oversold: 30.0,
            rsi_overbought: 70.0,
        }
    }
}
