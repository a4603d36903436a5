//! Market-condition assessment and derived trade parameters

use crate::config::FusionConfig;
use crate::decision::Signal;
use crate::indicators::return_volatility;
use crate::types::TrendBias;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Return volatility above this is a volatile market
pub const VOLATILE_THRESHOLD: f64 = 0.03;

/// Fused confidence must deviate at least this much from 0.5 to call a trend
pub const TRENDING_DEVIATION: f64 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketRegime {
    Ranging,
    TrendingBullish,
    TrendingBearish,
    Volatile,
}

impl MarketRegime {
    pub fn is_trending(self) -> bool {
        matches!(self, MarketRegime::TrendingBullish | MarketRegime::TrendingBearish)
    }
}

impl fmt::Display for MarketRegime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MarketRegime::Ranging => "ranging",
            MarketRegime::TrendingBullish => "trending bullish",
            MarketRegime::TrendingBearish => "trending bearish",
            MarketRegime::Volatile => "volatile",
        };
        f.write_str(s)
    }
}

/// Snapshot of the market at decision time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketCondition {
    pub regime: MarketRegime,
    /// 0..=1, distance of the fused score from neutral scaled to full range
    pub strength: f64,
    /// Clamped return volatility
    pub volatility: f64,
}

/// Classify the market from the fused score, dominant trend and volatility
pub fn assess_market_condition(
    final_confidence: f64,
    dominant_trend: TrendBias,
    volatility: f64,
) -> MarketCondition {
    let deviation = (final_confidence - 0.5).abs();
    let regime = if volatility > VOLATILE_THRESHOLD {
        MarketRegime::Volatile
    } else if deviation > TRENDING_DEVIATION {
        match dominant_trend {
            TrendBias::Bullish => MarketRegime::TrendingBullish,
            TrendBias::Bearish => MarketRegime::TrendingBearish,
            TrendBias::Neutral => MarketRegime::Ranging,
        }
    } else {
        MarketRegime::Ranging
    };

    MarketCondition {
        regime,
        strength: (deviation * 2.0).min(1.0),
        volatility,
    }
}

/// Clamped return volatility of `closes`, or `None` with too little history
pub fn decision_volatility(closes: &[f64], config: &FusionConfig) -> Option<f64> {
    return_volatility(closes, config.volatility_lookback)
        .map(|v| v.clamp(config.min_volatility, config.max_volatility))
}

/// Preferred entry order type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
    Limit,
}

/// Execution parameters tuned to the market condition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizedParameters {
    pub hold_duration_minutes: u32,
    /// Profit (percent) at which a trailing stop is armed
    pub trailing_stop_activation_pct: f64,
    pub order_type: OrderType,
    pub trades_per_day: u32,
}

/// Derive execution parameters from a market condition.
///
/// Trending markets hold longer and trade less; volatile markets hold
/// briefly and enter at market.
pub fn optimize_parameters(condition: &MarketCondition) -> OptimizedParameters {
    let base_hold = match condition.regime {
        MarketRegime::TrendingBullish | MarketRegime::TrendingBearish => 240.0,
        MarketRegime::Ranging => 90.0,
        MarketRegime::Volatile => 45.0,
    };
    let hold_duration_minutes = (base_hold * (1.0 + condition.strength)).round() as u32;

    let trailing_stop_activation_pct = (condition.volatility * 150.0).clamp(0.5, 5.0);

    let order_type = if condition.regime == MarketRegime::Volatile || condition.strength > 0.6 {
        OrderType::Market
    } else {
        OrderType::Limit
    };

    let trades_per_day = match condition.regime {
        MarketRegime::Ranging => 6,
        MarketRegime::TrendingBullish | MarketRegime::TrendingBearish => {
            if condition.strength < 0.5 {
                4
            } else {
                3
            }
        }
        MarketRegime::Volatile => 2,
    };

    OptimizedParameters {
        hold_duration_minutes,
        trailing_stop_activation_pct,
        order_type,
        trades_per_day,
    }
}

/// Stop-loss and take-profit prices; both equal `price` for NEUTRAL.
///
/// With a volatility estimate the offsets are volatility multiples,
/// otherwise the configured fixed percentages.
pub fn stop_and_target(
    signal: Signal,
    price: f64,
    volatility: Option<f64>,
    config: &FusionConfig,
) -> (f64, f64) {
    let (stop, target) = match (signal, volatility) {
        (Signal::Neutral, _) => return (price, price),
        (Signal::Buy, Some(v)) => (
            v * config.long_stop_multiplier,
            v * config.long_target_multiplier,
        ),
        (Signal::Sell, Some(v)) => (
            v * config.short_stop_multiplier,
            v * config.short_target_multiplier,
        ),
        (_, None) => (config.stop_loss_pct, config.take_profit_pct),
    };

    match signal {
        Signal::Sell => (price * (1.0 + stop), price * (1.0 - target)),
        _ => (price * (1.0 - stop), price * (1.0 + target)),
    }
}
