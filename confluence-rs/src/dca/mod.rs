//! DCA (dollar-cost averaging) ladders
//!
//! Pyramiding entry levels placed on the adverse side of an entry price.

pub mod ladder;

pub use ladder::*;

use crate::decision::MarketRegime;
use crate::types::{PositionSide, TrendBias};
use serde::{Deserialize, Serialize};

/// One rung of the ladder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcaLevel {
    /// 1-based, nearest-to-entry first
    pub level: u32,
    pub price: f64,
    pub amount: f64,
    /// Halfway back to entry; set in optimized mode
    pub partial_take_profit: Option<f64>,
    /// Price beyond this level at which to add again; set with reinforcement
    pub reinforcement_threshold: Option<f64>,
}

/// Optional ladder behaviour
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DcaOptions {
    /// Wider volatility scaling plus partial take-profits
    pub optimize: bool,
    /// Substitute support/resistance levels for percentage levels
    pub adaptive_positioning: bool,
    pub support_resistance: Vec<f64>,
    /// Exponential instead of linear amount growth
    pub variable_amounts: bool,
    pub reinforcement: bool,
    /// Recent price action direction
    pub price_action: TrendBias,
}

/// Ladder request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcaRequest {
    pub entry_price: f64,
    pub side: PositionSide,
    pub initial_size: f64,
    pub levels: usize,
    /// Return volatility as a fraction (0.01 = 1%)
    pub volatility: f64,
    /// `None` when the condition is unknown
    pub market_condition: Option<MarketRegime>,
    #[serde(default)]
    pub options: DcaOptions,
}

impl DcaRequest {
    pub fn new(entry_price: f64, side: PositionSide, initial_size: f64, levels: usize) -> Self {
        Self {
            entry_price,
            side,
            initial_size,
            levels,
            volatility: 0.0,
            market_condition: None,
            options: DcaOptions::default(),
        }
    }

    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility;
        self
    }

    pub fn with_market_condition(mut self, regime: MarketRegime) -> Self {
        self.market_condition = Some(regime);
        self
    }

    pub fn with_options(mut self, options: DcaOptions) -> Self {
        self.options = options;
        self
    }
}
