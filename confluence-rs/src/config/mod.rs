//! Configuration module
//!
//! Every section has serde-friendly defaults; [`EngineConfig::from_env`]
//! overlays environment variables (and a `.env` file) on top of them.

pub mod averaging;
pub mod fusion;
pub mod simulation;

pub use averaging::*;
pub use fusion::*;
pub use simulation::*;

use crate::error::ConfigError;
use anyhow::Context;
use dotenv::dotenv;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Top-level engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub fusion: FusionConfig,
    pub backtest: BacktestConfig,
    pub dca: DcaConfig,
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
        None => Ok(None),
    }
}

impl EngineConfig {
    /// Load from the process environment after reading `.env` if present.
    ///
    /// Recognised variables: `FUSION_PROFILE`, `MIN_LEVERAGE`,
    /// `MAX_LEVERAGE`, `ASSESS_MARKET_CONDITION`, `INITIAL_CAPITAL`,
    /// `BACKTEST_LEVERAGE`, `RISK_PER_TRADE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, starting from defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let profile = match lookup("FUSION_PROFILE") {
            Some(raw) => raw.parse()?,
            None => FusionProfile::default(),
        };

        let mut config = Self {
            fusion: FusionConfig::profile(profile),
            ..Self::default()
        };

        if let Some(min) = parse_var(&lookup, "MIN_LEVERAGE")? {
            config.fusion.min_leverage = min;
        }
        if let Some(max) = parse_var(&lookup, "MAX_LEVERAGE")? {
            config.fusion.max_leverage = max;
        }
        if let Some(assess) = parse_var(&lookup, "ASSESS_MARKET_CONDITION")? {
            config.fusion.assess_market_condition = assess;
        }
        if let Some(capital) = parse_var(&lookup, "INITIAL_CAPITAL")? {
            config.backtest.initial_capital = capital;
        }
        if let Some(leverage) = parse_var(&lookup, "BACKTEST_LEVERAGE")? {
            config.backtest.leverage = leverage;
        }
        if let Some(risk) = parse_var(&lookup, "RISK_PER_TRADE")? {
            config.backtest.risk_per_trade_pct = risk;
        }

        config.fusion.validate()?;
        Ok(config)
    }

    /// Parse a JSON document; missing sections and fields keep their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.fusion.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_vars() {
        let config = EngineConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_env_overrides() {
        let config = EngineConfig::from_lookup(lookup(&[
            ("FUSION_PROFILE", "high_leverage"),
            ("MIN_LEVERAGE", "2"),
            ("RISK_PER_TRADE", "5"),
            ("ASSESS_MARKET_CONDITION", "false"),
        ]))
        .unwrap();
        assert_eq!(config.fusion.profile, FusionProfile::HighLeverage);
        assert_eq!(config.fusion.max_leverage, 50);
        assert_eq!(config.fusion.min_leverage, 2);
        assert!(!config.fusion.assess_market_condition);
        assert_eq!(config.backtest.risk_per_trade_pct, 5.0);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = EngineConfig::from_lookup(lookup(&[("MAX_LEVERAGE", "lots")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "MAX_LEVERAGE", .. }));

        let err = EngineConfig::from_lookup(lookup(&[("MIN_LEVERAGE", "20")])).unwrap_err();
        assert!(matches!(err, ConfigError::LeverageBounds { min: 20, max: 15 }));
    }

    #[test]
    fn test_partial_json() {
        let config = EngineConfig::from_json_str(
            r#"{ "fusion": { "max_leverage": 20 }, "backtest": { "leverage": 3.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.fusion.max_leverage, 20);
        assert_eq!(config.fusion.weight("1d"), 0.8);
        assert_eq!(config.backtest.leverage, 3.0);
        assert_eq!(config.backtest.warmup, 50);
    }
}
