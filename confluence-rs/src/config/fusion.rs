//! Multi-timeframe fusion configuration

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Named weight/leverage tables.
///
/// `Standard` caps leverage at 15x and weights the daily chart 0.8;
/// `HighLeverage` caps at 50x and leans harder on higher timeframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionProfile {
    #[default]
    Standard,
    HighLeverage,
}

impl FromStr for FusionProfile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(FusionProfile::Standard),
            "high_leverage" | "high-leverage" => Ok(FusionProfile::HighLeverage),
            other => Err(ConfigError::UnknownProfile(other.to_string())),
        }
    }
}

const STANDARD_WEIGHTS: [(&str, f64); 13] = [
    ("1m", 0.05),
    ("3m", 0.08),
    ("5m", 0.1),
    ("15m", 0.2),
    ("30m", 0.3),
    ("1h", 0.4),
    ("2h", 0.5),
    ("4h", 0.6),
    ("6h", 0.65),
    ("12h", 0.7),
    ("1d", 0.8),
    ("3d", 0.9),
    ("1w", 1.0),
];

const HIGH_LEVERAGE_WEIGHTS: [(&str, f64); 13] = [
    ("1m", 0.05),
    ("3m", 0.08),
    ("5m", 0.1),
    ("15m", 0.2),
    ("30m", 0.35),
    ("1h", 0.5),
    ("2h", 0.6),
    ("4h", 0.75),
    ("6h", 0.8),
    ("12h", 0.9),
    ("1d", 1.0),
    ("3d", 1.1),
    ("1w", 1.2),
];

const PATTERN_MULTIPLIERS: [(&str, f64); 13] = [
    ("1m", 0.5),
    ("3m", 0.55),
    ("5m", 0.6),
    ("15m", 0.7),
    ("30m", 0.8),
    ("1h", 0.9),
    ("2h", 0.95),
    ("4h", 1.0),
    ("6h", 1.0),
    ("12h", 1.05),
    ("1d", 1.1),
    ("3d", 1.15),
    ("1w", 1.2),
];

fn table(entries: &[(&str, f64)]) -> BTreeMap<String, f64> {
    entries.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Fusion engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    pub profile: FusionProfile,
    /// Weight per timeframe label
    pub timeframe_weights: BTreeMap<String, f64>,
    /// Weight for labels missing from the table
    pub default_weight: f64,
    /// Scale applied to candlestick-pattern adjustments per timeframe
    pub pattern_multipliers: BTreeMap<String, f64>,
    pub default_pattern_multiplier: f64,
    pub min_leverage: u32,
    pub max_leverage: u32,
    /// Fused confidence above this is a BUY
    pub buy_threshold: f64,
    /// Fused confidence below this is a SELL
    pub sell_threshold: f64,
    /// Borderline band that can be elevated to BUY
    pub elevated_buy_threshold: f64,
    /// Borderline band that can be elevated to SELL
    pub elevated_sell_threshold: f64,
    /// Timeframes whose trend and EMA must agree for an elevation
    pub elevation_timeframes: Vec<String>,
    /// Fixed stop-loss offset (fraction of price)
    pub stop_loss_pct: f64,
    /// Fixed take-profit offset (fraction of price)
    pub take_profit_pct: f64,
    /// Derive volatility-scaled SL/TP and optimized parameters when candles are attached
    pub assess_market_condition: bool,
    pub volatility_lookback: usize,
    pub min_volatility: f64,
    pub max_volatility: f64,
    pub long_stop_multiplier: f64,
    pub long_target_multiplier: f64,
    pub short_stop_multiplier: f64,
    pub short_target_multiplier: f64,
}

impl FusionConfig {
    /// Build the tables for a named profile
    pub fn profile(profile: FusionProfile) -> Self {
        let (weights, max_leverage) = match profile {
            FusionProfile::Standard => (table(&STANDARD_WEIGHTS), 15),
            FusionProfile::HighLeverage => (table(&HIGH_LEVERAGE_WEIGHTS), 50),
        };
        Self {
            profile,
            timeframe_weights: weights,
            default_weight: 0.1,
            pattern_multipliers: table(&PATTERN_MULTIPLIERS),
            default_pattern_multiplier: 0.8,
            min_leverage: 1,
            max_leverage,
            buy_threshold: 0.75,
            sell_threshold: 0.25,
            elevated_buy_threshold: 0.70,
            elevated_sell_threshold: 0.30,
            elevation_timeframes: vec!["5m".to_string(), "15m".to_string()],
            stop_loss_pct: 0.02,
            take_profit_pct: 0.05,
            assess_market_condition: true,
            volatility_lookback: 20,
            min_volatility: 0.005,
            max_volatility: 0.05,
            long_stop_multiplier: 3.0,
            long_target_multiplier: 8.5,
            short_stop_multiplier: 3.0,
            short_target_multiplier: 8.0,
        }
    }

    /// Override leverage bounds
    pub fn with_leverage(mut self, min_leverage: u32, max_leverage: u32) -> Self {
        self.min_leverage = min_leverage;
        self.max_leverage = max_leverage;
        self
    }

    /// Weight of a timeframe label
    pub fn weight(&self, timeframe: &str) -> f64 {
        self.timeframe_weights
            .get(timeframe)
            .copied()
            .unwrap_or(self.default_weight)
    }

    /// Pattern adjustment multiplier of a timeframe label
    pub fn pattern_multiplier(&self, timeframe: &str) -> f64 {
        self.pattern_multipliers
            .get(timeframe)
            .copied()
            .unwrap_or(self.default_pattern_multiplier)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_leverage > self.max_leverage {
            return Err(ConfigError::LeverageBounds {
                min: self.min_leverage,
                max: self.max_leverage,
            });
        }
        if !(0.0..=1.0).contains(&self.sell_threshold)
            || !(0.0..=1.0).contains(&self.buy_threshold)
            || self.sell_threshold >= self.buy_threshold
        {
            return Err(ConfigError::InvalidValue {
                key: "buy_threshold/sell_threshold",
                value: format!("{}/{}", self.buy_threshold, self.sell_threshold),
            });
        }
        Ok(())
    }
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self::profile(FusionProfile::Standard)
    }
}
