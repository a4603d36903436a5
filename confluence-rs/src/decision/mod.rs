//! Multi-timeframe decision engine
//!
//! Fuses per-timeframe analyses into a single [`TradingDecision`] with
//! leverage, stop-loss/take-profit and human-readable reasoning.

pub mod engine;
pub mod market;
pub mod reasoning;
pub mod validator;

pub use engine::*;
pub use market::*;
pub use reasoning::*;
pub use validator::*;

use crate::types::TrendBias;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Decision signal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    /// Open or add to a long
    Buy,
    /// Open or add to a short
    Sell,
    /// No action
    Neutral,
}

impl Signal {
    /// Market direction the signal bets on
    pub fn bias(self) -> TrendBias {
        match self {
            Signal::Buy => TrendBias::Bullish,
            Signal::Sell => TrendBias::Bearish,
            Signal::Neutral => TrendBias::Neutral,
        }
    }

    pub fn is_directional(self) -> bool {
        self != Signal::Neutral
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => f.write_str("BUY"),
            Signal::Sell => f.write_str("SELL"),
            Signal::Neutral => f.write_str("NEUTRAL"),
        }
    }
}

/// Fused trading decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingDecision {
    pub signal: Signal,
    /// Confidence of the winning side: the fused score for BUY, one minus
    /// it for SELL, the raw fused score for NEUTRAL
    pub confidence: f64,
    /// Timeframe whose confidence deviates most from 0.5
    pub dominant_timeframe: String,
    pub price: f64,
    pub reasoning: Vec<String>,
    pub supporting_indicators: Vec<String>,
    pub leverage: u32,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub timestamp: DateTime<Utc>,
    pub market_condition: Option<MarketCondition>,
    pub optimized_parameters: Option<OptimizedParameters>,
}

impl TradingDecision {
    /// Stop distance as a fraction of price
    pub fn risk_fraction(&self) -> f64 {
        if self.price == 0.0 {
            return 0.0;
        }
        (self.price - self.stop_loss).abs() / self.price
    }

    /// Reward-to-risk ratio; 0 when there is no stop distance
    pub fn reward_to_risk(&self) -> f64 {
        let risk = (self.price - self.stop_loss).abs();
        if risk == 0.0 {
            return 0.0;
        }
        (self.take_profit - self.price).abs() / risk
    }
}
