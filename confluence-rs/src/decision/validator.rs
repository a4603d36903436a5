//! Decision validation

use crate::config::FusionConfig;
use crate::decision::{Signal, TradingDecision};

/// Decision validator
pub struct DecisionValidator;

impl DecisionValidator {
    /// Validate a decision against the leverage bounds it was produced with
    pub fn validate(decision: &TradingDecision, config: &FusionConfig) -> bool {
        let in_bounds = decision.leverage >= config.min_leverage
            && decision.leverage <= config.max_leverage;
        let confidence_ok = (0.0..=1.0).contains(&decision.confidence);

        match decision.signal {
            Signal::Buy => {
                in_bounds
                    && confidence_ok
                    && decision.stop_loss <= decision.price
                    && decision.take_profit >= decision.price
            }
            Signal::Sell => {
                in_bounds
                    && confidence_ok
                    && decision.stop_loss >= decision.price
                    && decision.take_profit <= decision.price
            }
            Signal::Neutral => in_bounds && confidence_ok,
        }
    }

    /// Check if a decision is worth acting on
    pub fn is_actionable(
        decision: &TradingDecision,
        config: &FusionConfig,
        min_confidence: f64,
    ) -> bool {
        Self::validate(decision, config)
            && decision.confidence >= min_confidence
            && decision.signal.is_directional()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn decision(signal: Signal, confidence: f64, leverage: u32) -> TradingDecision {
        TradingDecision {
            signal,
            confidence,
            dominant_timeframe: "1h".to_string(),
            price: 100.0,
            reasoning: Vec::new(),
            supporting_indicators: Vec::new(),
            leverage,
            stop_loss: 98.0,
            take_profit: 105.0,
            timestamp: Utc::now(),
            market_condition: None,
            optimized_parameters: None,
        }
    }

    #[test]
    fn test_validate() {
        let config = FusionConfig::default();
        assert!(DecisionValidator::validate(&decision(Signal::Buy, 0.8, 12), &config));
        assert!(!DecisionValidator::validate(&decision(Signal::Buy, 0.8, 20), &config));
        assert!(!DecisionValidator::validate(&decision(Signal::Buy, 1.2, 5), &config));
        // long-side stop and target on a short
        assert!(!DecisionValidator::validate(&decision(Signal::Sell, 0.8, 5), &config));
    }

    #[test]
    fn test_is_actionable() {
        let config = FusionConfig::default();
        assert!(DecisionValidator::is_actionable(&decision(Signal::Buy, 0.8, 12), &config, 0.75));
        assert!(!DecisionValidator::is_actionable(&decision(Signal::Buy, 0.7, 12), &config, 0.75));
        let neutral = decision(Signal::Neutral, 0.9, 1);
        assert!(!DecisionValidator::is_actionable(&neutral, &config, 0.5));
    }
}
