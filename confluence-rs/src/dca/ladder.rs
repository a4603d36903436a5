//! DCA ladder calculation

use crate::config::DcaConfig;
use crate::dca::{DcaLevel, DcaRequest};
use crate::decision::MarketRegime;
use crate::types::{PositionSide, TrendBias};
use tracing::debug;

/// Relative distance under which two rungs are the same trigger price
const PRICE_TOLERANCE: f64 = 1e-9;

fn is_adverse(entry: f64, side: PositionSide, price: f64) -> bool {
    match side {
        PositionSide::Long => price < entry,
        PositionSide::Short => price > entry,
    }
}

fn distance(entry: f64, price: f64) -> f64 {
    (price - entry).abs() / entry
}

/// Builds DCA ladders from a [`DcaConfig`]
#[derive(Debug, Clone, Default)]
pub struct DcaCalculator {
    config: DcaConfig,
}

impl DcaCalculator {
    pub fn new(config: DcaConfig) -> Self {
        Self { config }
    }

    /// Adverse move (percent) per level; levels past the base ladder extend
    /// it by a fixed step
    pub fn base_percentages(&self, levels: usize) -> Vec<f64> {
        let base = &self.config.base_percentages;
        let last = base.last().copied().unwrap_or(0.0);
        (0..levels)
            .map(|i| match base.get(i) {
                Some(pct) => *pct,
                None => last + self.config.extension_step_pct * (i + 1 - base.len()) as f64,
            })
            .collect()
    }

    fn volatility_multiplier(&self, request: &DcaRequest) -> f64 {
        let k = if request.options.optimize {
            self.config.optimized_volatility_factor
        } else {
            self.config.volatility_factor
        };
        1.0 + request.volatility.max(0.0) * k
    }

    /// Tighter in ranging or aligned trends, wider in volatile or opposing ones
    pub fn market_multiplier(regime: Option<MarketRegime>, side: PositionSide) -> f64 {
        match regime {
            Some(MarketRegime::Ranging) => 0.8,
            Some(MarketRegime::Volatile) => 1.3,
            Some(MarketRegime::TrendingBullish) => {
                if side == PositionSide::Long {
                    0.9
                } else {
                    1.2
                }
            }
            Some(MarketRegime::TrendingBearish) => {
                if side == PositionSide::Short {
                    0.9
                } else {
                    1.2
                }
            }
            None => 1.0,
        }
    }

    pub fn price_action_multiplier(price_action: TrendBias, side: PositionSide) -> f64 {
        if price_action == side.bias() {
            0.9
        } else if price_action.opposes(side.bias()) {
            1.2
        } else {
            1.0
        }
    }

    fn level_price(&self, entry: f64, side: PositionSide, fraction: f64) -> f64 {
        match side {
            PositionSide::Long => entry * (1.0 - fraction.min(self.config.max_long_depth)),
            PositionSide::Short => entry * (1.0 + fraction),
        }
    }

    /// Replace percentage levels after the first with nearby support/resistance
    fn substitute_levels(&self, request: &DcaRequest, prices: Vec<f64>) -> Vec<f64> {
        let entry = request.entry_price;
        let cfg = &self.config;

        let mut candidates: Vec<f64> = request
            .options
            .support_resistance
            .iter()
            .copied()
            .filter(|p| p.is_finite() && is_adverse(entry, request.side, *p))
            .filter(|p| {
                let d = distance(entry, *p);
                d >= cfg.sr_min_distance && d <= cfg.sr_max_distance
            })
            .collect();
        candidates.sort_by(|a, b| distance(entry, *a).total_cmp(&distance(entry, *b)));

        let Some(&anchor) = prices.first() else {
            return prices;
        };
        let mut kept = vec![anchor];
        for candidate in candidates {
            if kept.len() >= prices.len() {
                break;
            }
            let too_close = kept
                .iter()
                .any(|k| (candidate - k).abs() / k.abs() < cfg.sr_merge_distance);
            if !too_close {
                kept.push(candidate);
            }
        }

        let missing = prices.len() - kept.len();
        debug!(
            "Adaptive DCA: {} support/resistance levels substituted",
            kept.len() - 1
        );
        kept.extend(prices.iter().skip(1).take(missing));
        kept
    }

    /// Compute the ladder; empty for zero levels or a non-positive entry or size
    pub fn calculate(&self, request: &DcaRequest) -> Vec<DcaLevel> {
        let entry = request.entry_price;
        if request.levels == 0
            || !entry.is_finite()
            || entry <= 0.0
            || !request.initial_size.is_finite()
            || request.initial_size <= 0.0
        {
            return Vec::new();
        }
        let side = request.side;
        let opts = &request.options;

        let multiplier = self.volatility_multiplier(request)
            * Self::market_multiplier(request.market_condition, side)
            * Self::price_action_multiplier(opts.price_action, side);

        let mut prices: Vec<f64> = self
            .base_percentages(request.levels)
            .into_iter()
            .map(|pct| self.level_price(entry, side, pct / 100.0 * multiplier))
            .collect();

        if opts.adaptive_positioning && !opts.support_resistance.is_empty() {
            prices = self.substitute_levels(request, prices);
        }

        match side {
            PositionSide::Long => prices.sort_by(|a, b| b.total_cmp(a)),
            PositionSide::Short => prices.sort_by(|a, b| a.total_cmp(b)),
        }
        // Rungs pinned to the depth cap (or landing on an S/R level) collapse into one
        let before = prices.len();
        prices.dedup_by(|a, b| (*a - *b).abs() <= entry * PRICE_TOLERANCE);
        if prices.len() < before {
            debug!("DCA: merged {} duplicate levels", before - prices.len());
        }

        let mut previous = entry;
        let levels: Vec<DcaLevel> = prices
            .into_iter()
            .enumerate()
            .map(|(i, price)| {
                let amount = if opts.variable_amounts {
                    request.initial_size * self.config.exponential_base.powi(i as i32)
                } else {
                    request.initial_size * (1.0 + self.config.linear_step * i as f64)
                };

                let partial_take_profit = opts.optimize.then(|| price + (entry - price) / 2.0);

                let half_step = (price - previous).abs() / 2.0;
                let reinforcement_threshold = opts.reinforcement.then(|| match side {
                    PositionSide::Long => (price - half_step).max(0.0),
                    PositionSide::Short => price + half_step,
                });
                previous = price;

                DcaLevel {
                    level: i as u32 + 1,
                    price,
                    amount,
                    partial_take_profit,
                    reinforcement_threshold,
                }
            })
            .collect();

        debug!(
            "DCA ladder for {} entry {:.4}: {} levels, multiplier {:.3}",
            side,
            entry,
            levels.len(),
            multiplier
        );
        levels
    }
}

/// Ladder with the default configuration
pub fn calculate_dca_levels(request: &DcaRequest) -> Vec<DcaLevel> {
    DcaCalculator::default().calculate(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dca::DcaOptions;

    fn prices(levels: &[DcaLevel]) -> Vec<f64> {
        levels.iter().map(|l| l.price).collect()
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{} != {}", a, e);
        }
    }

    #[test]
    fn test_long_ladder_with_volatility() {
        let request = DcaRequest::new(100.0, PositionSide::Long, 1.0, 3).with_volatility(0.01);
        let levels = calculate_dca_levels(&request);

        assert_close(&prices(&levels), &[96.85, 92.65, 87.4]);
        assert_eq!(levels.iter().map(|l| l.level).collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_close(&levels.iter().map(|l| l.amount).collect::<Vec<_>>(), &[1.0, 1.5, 2.0]);
        assert!(levels.iter().all(|l| l.partial_take_profit.is_none()));
    }

    #[test]
    fn test_short_ladder_ascends() {
        let request = DcaRequest::new(100.0, PositionSide::Short, 2.0, 3);
        let levels = calculate_dca_levels(&request);
        assert_close(&prices(&levels), &[103.0, 107.0, 112.0]);
    }

    #[test]
    fn test_extended_ladder() {
        let calculator = DcaCalculator::default();
        assert_eq!(
            calculator.base_percentages(7),
            vec![3.0, 7.0, 12.0, 18.0, 25.0, 33.0, 41.0]
        );
        let levels = calculate_dca_levels(&DcaRequest::new(100.0, PositionSide::Long, 1.0, 7));
        assert_eq!(levels.len(), 7);
        assert!((levels[6].price - 59.0).abs() < 1e-9);
    }

    #[test]
    fn test_long_depth_is_capped() {
        let request = DcaRequest::new(100.0, PositionSide::Long, 1.0, 5).with_volatility(1.0);
        let levels = calculate_dca_levels(&request);
        assert!(levels.iter().all(|l| l.price >= 5.0 - 1e-9));
    }

    #[test]
    fn test_capped_rungs_are_merged() {
        // x6 multiplier pushes the 18% and 25% rungs past the 95% cap
        let request = DcaRequest::new(100.0, PositionSide::Long, 1.0, 5).with_volatility(1.0);
        let levels = calculate_dca_levels(&request);

        assert_close(&prices(&levels), &[82.0, 58.0, 28.0, 5.0]);
        assert!(levels.windows(2).all(|w| w[1].price < w[0].price));
        assert_eq!(levels.iter().map(|l| l.level).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_close(&levels.iter().map(|l| l.amount).collect::<Vec<_>>(), &[1.0, 1.5, 2.0, 2.5]);
    }

    #[test]
    fn test_condition_multipliers() {
        let ranging = DcaRequest::new(100.0, PositionSide::Long, 1.0, 1)
            .with_market_condition(MarketRegime::Ranging);
        assert!((calculate_dca_levels(&ranging)[0].price - 97.6).abs() < 1e-9);

        let against = DcaRequest::new(100.0, PositionSide::Long, 1.0, 1)
            .with_market_condition(MarketRegime::TrendingBearish);
        assert!((calculate_dca_levels(&against)[0].price - 96.4).abs() < 1e-9);

        let aligned_action =
            DcaRequest::new(100.0, PositionSide::Short, 1.0, 1).with_options(DcaOptions {
                price_action: TrendBias::Bearish,
                ..DcaOptions::default()
            });
        assert!((calculate_dca_levels(&aligned_action)[0].price - 102.7).abs() < 1e-9);
    }

    #[test]
    fn test_adaptive_positioning() {
        let request = DcaRequest::new(100.0, PositionSide::Long, 1.0, 4).with_options(DcaOptions {
            adaptive_positioning: true,
            support_resistance: vec![95.0, 99.5, 110.0, 60.0, 90.0, 89.8],
            ..DcaOptions::default()
        });
        let levels = calculate_dca_levels(&request);
        assert_close(&prices(&levels), &[97.0, 95.0, 93.0, 90.0]);
        assert_eq!(levels[3].level, 4);
    }

    #[test]
    fn test_optimized_with_reinforcement() {
        let request = DcaRequest::new(100.0, PositionSide::Long, 1.0, 2).with_options(DcaOptions {
            optimize: true,
            reinforcement: true,
            variable_amounts: true,
            ..DcaOptions::default()
        });
        let levels = calculate_dca_levels(&request);
        assert_close(&prices(&levels), &[97.0, 93.0]);
        let take_profits: Vec<f64> = levels.iter().filter_map(|l| l.partial_take_profit).collect();
        assert_close(&take_profits, &[98.5, 96.5]);
        let thresholds: Vec<f64> = levels
            .iter()
            .filter_map(|l| l.reinforcement_threshold)
            .collect();
        assert_close(&thresholds, &[95.5, 91.0]);
        assert_close(&[levels[1].amount], &[1.5]);
    }

    #[test]
    fn test_degenerate_requests() {
        let no_levels = DcaRequest::new(100.0, PositionSide::Long, 1.0, 0);
        assert!(calculate_dca_levels(&no_levels).is_empty());
        let zero_entry = DcaRequest::new(0.0, PositionSide::Long, 1.0, 3);
        assert!(calculate_dca_levels(&zero_entry).is_empty());
        let negative_entry = DcaRequest::new(-5.0, PositionSide::Short, 1.0, 3);
        assert!(calculate_dca_levels(&negative_entry).is_empty());
    }
}
