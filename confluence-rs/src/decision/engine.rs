//! Weighted multi-timeframe fusion

use crate::analysis::{TimeframeAnalysis, PATTERN_LOOKBACK};
use crate::config::FusionConfig;
use crate::data::closes;
use crate::decision::{
    assess_market_condition, build_reasoning, decision_volatility, optimize_parameters,
    stop_and_target, supporting_indicators, Signal, TradingDecision,
};
use crate::patterns::{detect_recent_patterns, significant_patterns, PatternResult};
use crate::types::TrendBias;
use chrono::Utc;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Scale from pattern significance (0..100) to confidence points
pub const PATTERN_ADJUSTMENT_SCALE: f64 = 0.15;

/// Bound on a single timeframe's pattern adjustment
pub const MAX_PATTERN_ADJUSTMENT: f64 = 0.25;

/// Confidence shift from significant patterns, bounded to ±0.25
pub fn pattern_adjustment(patterns: &[PatternResult]) -> f64 {
    patterns
        .iter()
        .map(|p| p.trend.sign() * p.significance / 100.0 * PATTERN_ADJUSTMENT_SCALE)
        .sum::<f64>()
        .clamp(-MAX_PATTERN_ADJUSTMENT, MAX_PATTERN_ADJUSTMENT)
}

/// Fuses timeframe analyses into a [`TradingDecision`]
#[derive(Debug, Clone, Default)]
pub struct DecisionEngine {
    config: FusionConfig,
}

struct Accumulated<'a> {
    weighted_sum: f64,
    total_weight: f64,
    dominant: Option<&'a TimeframeAnalysis>,
    pattern_labels: Vec<String>,
}

impl DecisionEngine {
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    fn accumulate<'a>(&self, analyses: &'a BTreeMap<String, TimeframeAnalysis>) -> Accumulated<'a> {
        let mut acc = Accumulated {
            weighted_sum: 0.0,
            total_weight: 0.0,
            dominant: None,
            pattern_labels: Vec::new(),
        };
        let mut best_deviation = f64::NEG_INFINITY;

        for (timeframe, analysis) in analyses {
            let weight = self.config.weight(timeframe);
            if analysis.insufficient_data {
                warn!(
                    "Timeframe {} has insufficient data; its neutral score still carries weight {}",
                    timeframe, weight
                );
            }

            acc.weighted_sum += weight * (analysis.confidence - 0.5);
            acc.total_weight += weight;

            let deviation = (analysis.confidence - 0.5).abs();
            if !analysis.insufficient_data && deviation > best_deviation {
                best_deviation = deviation;
                acc.dominant = Some(analysis);
            }

            if let Some(candles) = &analysis.candles {
                let patterns =
                    significant_patterns(&detect_recent_patterns(candles, PATTERN_LOOKBACK));
                let adjustment =
                    pattern_adjustment(&patterns) * self.config.pattern_multiplier(timeframe);
                acc.weighted_sum += weight * adjustment;
                debug!(
                    "Timeframe {}: weight={}, confidence={:.3}, pattern adjustment={:.4}",
                    timeframe, weight, analysis.confidence, adjustment
                );
                acc.pattern_labels.extend(
                    patterns
                        .iter()
                        .map(|p| format!("{} {:.0} [{}]", p.pattern, p.significance, timeframe)),
                );
            }
        }

        acc
    }

    /// True when every elevation timeframe shows trend and EMA in `bias`
    fn elevation_confirmed(
        &self,
        analyses: &BTreeMap<String, TimeframeAnalysis>,
        bias: TrendBias,
    ) -> bool {
        !self.config.elevation_timeframes.is_empty()
            && self.config.elevation_timeframes.iter().all(|tf| {
                analyses
                    .get(tf)
                    .is_some_and(|a| a.trend == bias && a.ema_status == bias)
            })
    }

    fn select_signal(
        &self,
        final_confidence: f64,
        analyses: &BTreeMap<String, TimeframeAnalysis>,
    ) -> (Signal, Option<String>) {
        let cfg = &self.config;
        if final_confidence > cfg.buy_threshold {
            return (Signal::Buy, None);
        }
        if final_confidence < cfg.sell_threshold {
            return (Signal::Sell, None);
        }

        let candidate = if final_confidence > cfg.elevated_buy_threshold {
            Signal::Buy
        } else if final_confidence < cfg.elevated_sell_threshold {
            Signal::Sell
        } else {
            return (Signal::Neutral, None);
        };

        if self.elevation_confirmed(analyses, candidate.bias()) {
            let note = format!(
                "Elevated from NEUTRAL to {}: {} trend and EMA all {}",
                candidate,
                cfg.elevation_timeframes.join("/"),
                candidate.bias()
            );
            (candidate, Some(note))
        } else {
            (Signal::Neutral, None)
        }
    }

    /// Linear leverage between the configured bounds; NEUTRAL gets the minimum
    pub fn leverage(&self, signal: Signal, side_confidence: f64) -> u32 {
        let min = self.config.min_leverage;
        let max = self.config.max_leverage.max(min);
        if !signal.is_directional() {
            return min;
        }
        let raw = min as f64 + (max - min) as f64 * side_confidence.clamp(0.0, 1.0);
        (raw.round() as u32).clamp(min, max)
    }

    /// Fuse the analyses at `current_price`
    pub fn fuse(
        &self,
        analyses: &BTreeMap<String, TimeframeAnalysis>,
        current_price: f64,
    ) -> TradingDecision {
        let acc = self.accumulate(analyses);

        let final_confidence = if acc.total_weight > 0.0 {
            (acc.weighted_sum / acc.total_weight + 0.5).clamp(0.0, 1.0)
        } else {
            0.5
        };

        let dominant = acc.dominant.or_else(|| analyses.values().next());
        let dominant_timeframe = dominant.map(|a| a.timeframe.clone()).unwrap_or_default();

        let (signal, elevation_note) = self.select_signal(final_confidence, analyses);
        let confidence = match signal {
            Signal::Sell => 1.0 - final_confidence,
            _ => final_confidence,
        };

        let mut reasoning = build_reasoning(signal, final_confidence, acc.dominant);
        reasoning.extend(elevation_note);
        let mut supporting = supporting_indicators(acc.dominant);
        supporting.extend(acc.pattern_labels);

        let volatility = if self.config.assess_market_condition {
            dominant
                .and_then(|a| a.candles.as_deref())
                .or_else(|| analyses.values().find_map(|a| a.candles.as_deref()))
                .and_then(|candles| decision_volatility(&closes(candles), &self.config))
        } else {
            None
        };

        let market_condition = volatility.map(|v| {
            let trend = dominant.map(|a| a.trend).unwrap_or_default();
            assess_market_condition(final_confidence, trend, v)
        });
        let optimized_parameters = market_condition.as_ref().map(optimize_parameters);
        let (stop_loss, take_profit) =
            stop_and_target(signal, current_price, volatility, &self.config);

        let decision = TradingDecision {
            signal,
            confidence,
            dominant_timeframe,
            price: current_price,
            reasoning,
            supporting_indicators: supporting,
            leverage: self.leverage(signal, confidence),
            stop_loss,
            take_profit,
            timestamp: Utc::now(),
            market_condition,
            optimized_parameters,
        };

        info!(
            "Decision: {} confidence={:.3} leverage={}x dominant={} SL={:.4} TP={:.4}",
            decision.signal,
            decision.confidence,
            decision.leverage,
            decision.dominant_timeframe,
            decision.stop_loss,
            decision.take_profit
        );
        decision
    }
}

/// Fuse with the standard weight profile and the given leverage bounds
pub fn fuse_decision(
    analyses: &BTreeMap<String, TimeframeAnalysis>,
    current_price: f64,
    min_leverage: u32,
    max_leverage: u32,
) -> TradingDecision {
    DecisionEngine::new(FusionConfig::default().with_leverage(min_leverage, max_leverage))
        .fuse(analyses, current_price)
}
