//! Single-timeframe analysis and confidence scoring

use crate::data::{closes, Candle};
use crate::indicators::{
    analyze_structure, calculate_atr, calculate_rsi, detect_divergence, detect_traps,
    latest_ema, volume_profile, Divergence, FibonacciLevels, StructureTag, ATR_PERIOD,
    RSI_PERIOD,
};
use crate::patterns::{detect_recent_patterns, significant_patterns, PatternResult};
use crate::types::TrendBias;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Below this many candles a timeframe yields a neutral analysis
pub const MIN_ANALYSIS_CANDLES: usize = 50;
/// Trailing candles used for structure, volume profile and Fibonacci levels
pub const STRUCTURE_WINDOW: usize = 50;
/// Patterns must end within this many trailing candles
pub const PATTERN_LOOKBACK: usize = 5;
/// Trailing candles kept on the analysis for the fusion step
pub const ATTACHED_CANDLES: usize = 100;

pub const EMA_FAST_PERIOD: usize = 8;
pub const EMA_SLOW_PERIOD: usize = 21;

/// Everything the fusion engine needs to know about one timeframe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeAnalysis {
    pub timeframe: String,
    pub trend: TrendBias,
    pub rsi: f64,
    pub ema_status: TrendBias,
    pub market_structure_tags: BTreeSet<StructureTag>,
    /// High-volume nodes at or below the current price, nearest first
    pub volume_support_levels: Vec<f64>,
    pub divergence: Divergence,
    /// 0.5 is neutral, above leans bullish, below bearish
    pub confidence: f64,
    /// Descending significance
    pub patterns: Vec<PatternResult>,
    pub price: f64,
    pub ema_fast: Option<f64>,
    pub ema_slow: Option<f64>,
    pub atr: f64,
    pub fibonacci: Option<FibonacciLevels>,
    /// Set when fewer than [`MIN_ANALYSIS_CANDLES`] candles were supplied
    pub insufficient_data: bool,
    /// Trailing candles re-scanned for patterns during fusion
    #[serde(skip)]
    pub candles: Option<Vec<Candle>>,
}

impl TimeframeAnalysis {
    /// Neutral analysis for a timeframe without enough history.
    ///
    /// Confidence is 0 and the analysis still takes part in the weighted
    /// average of the fusion step.
    pub fn insufficient(timeframe: &str, candles: &[Candle]) -> Self {
        Self {
            timeframe: timeframe.to_string(),
            trend: TrendBias::Neutral,
            rsi: 50.0,
            ema_status: TrendBias::Neutral,
            market_structure_tags: BTreeSet::new(),
            volume_support_levels: Vec::new(),
            divergence: Divergence::default(),
            confidence: 0.0,
            patterns: Vec::new(),
            price: candles.last().map(|c| c.close).unwrap_or_default(),
            ema_fast: None,
            ema_slow: None,
            atr: crate::indicators::DEFAULT_ATR,
            fibonacci: None,
            insufficient_data: true,
            candles: None,
        }
    }

    /// Analysis carrying only a confidence score, used when callers supply
    /// their own scoring
    pub fn with_confidence(timeframe: &str, confidence: f64) -> Self {
        Self {
            confidence,
            insufficient_data: false,
            ..Self::insufficient(timeframe, &[])
        }
    }

    /// Attach candles for pattern re-scanning during fusion
    pub fn with_candles(mut self, candles: &[Candle]) -> Self {
        let start = candles.len().saturating_sub(ATTACHED_CANDLES);
        self.candles = Some(candles[start..].to_vec());
        self
    }

    /// Significant patterns, strongest first
    pub fn top_patterns(&self) -> Vec<PatternResult> {
        significant_patterns(&self.patterns)
    }
}

/// Inputs to the confidence score
pub(crate) struct ScoreInputs<'a> {
    pub trend: TrendBias,
    pub ema_status: TrendBias,
    pub rsi: f64,
    pub divergence: &'a Divergence,
    pub tags: &'a BTreeSet<StructureTag>,
    pub patterns: &'a [PatternResult],
}

/// Confidence in [0,1]: 0.5 plus directional contributions
pub(crate) fn score_confidence(inputs: &ScoreInputs<'_>) -> f64 {
    let mut score = 0.5;
    score += 0.10 * inputs.trend.sign();
    score += 0.10 * inputs.ema_status.sign();

    if inputs.rsi < 30.0 {
        score += 0.10;
    } else if inputs.rsi > 70.0 {
        score -= 0.10;
    }

    let div = inputs.divergence;
    if div.bullish {
        score += div.strength / 1000.0;
    } else if div.bearish {
        score -= div.strength / 1000.0;
    }

    for tag in inputs.tags {
        score += match tag {
            StructureTag::BreakOfStructureBullish | StructureTag::BearTrap => 0.05,
            StructureTag::BreakOfStructureBearish | StructureTag::BullTrap => -0.05,
            StructureTag::FakeoutDown => 0.025,
            StructureTag::FakeoutUp => -0.025,
            _ => 0.0,
        };
    }

    for pattern in significant_patterns(inputs.patterns) {
        score += pattern.trend.sign() * pattern.significance / 2000.0;
    }

    score.clamp(0.0, 1.0)
}

/// Analyze one timeframe's candles.
///
/// Never fails: short input gives [`TimeframeAnalysis::insufficient`].
pub fn compute_timeframe_analysis(candles: &[Candle], timeframe: &str) -> TimeframeAnalysis {
    if candles.len() < MIN_ANALYSIS_CANDLES {
        warn!(
            "Timeframe {} has {} candles (< {}), using neutral analysis",
            timeframe,
            candles.len(),
            MIN_ANALYSIS_CANDLES
        );
        return TimeframeAnalysis::insufficient(timeframe, candles);
    }

    let closes = closes(candles);
    let rsi_series = calculate_rsi(&closes, RSI_PERIOD);
    let rsi = rsi_series.last().copied().flatten().unwrap_or(50.0);

    let ema_fast = latest_ema(&closes, EMA_FAST_PERIOD);
    let ema_slow = latest_ema(&closes, EMA_SLOW_PERIOD);
    let ema_status = match (ema_fast, ema_slow) {
        (Some(fast), Some(slow)) if fast > slow => TrendBias::Bullish,
        (Some(fast), Some(slow)) if fast < slow => TrendBias::Bearish,
        _ => TrendBias::Neutral,
    };

    let window = &candles[candles.len() - STRUCTURE_WINDOW..];
    let structure = analyze_structure(window);
    let traps = detect_traps(candles);
    let divergence = detect_divergence(candles, &rsi_series);
    let profile = volume_profile(window);
    let price = candles[candles.len() - 1].close;

    let trend = if structure.trend != TrendBias::Neutral {
        structure.trend
    } else {
        ema_status
    };
    let mut tags = structure.tags;
    tags.extend(traps.tags());

    let patterns = detect_recent_patterns(candles, PATTERN_LOOKBACK);
    let confidence = score_confidence(&ScoreInputs {
        trend,
        ema_status,
        rsi,
        divergence: &divergence,
        tags: &tags,
        patterns: &patterns,
    });

    debug!(
        "Analyzed {}: trend={}, rsi={:.2}, ema={}, confidence={:.3}, patterns={}",
        timeframe,
        trend,
        rsi,
        ema_status,
        confidence,
        patterns.len()
    );

    TimeframeAnalysis {
        timeframe: timeframe.to_string(),
        trend,
        rsi,
        ema_status,
        market_structure_tags: tags,
        volume_support_levels: profile.support_levels(price),
        divergence,
        confidence,
        patterns,
        price,
        ema_fast,
        ema_slow,
        atr: calculate_atr(candles, ATR_PERIOD),
        fibonacci: FibonacciLevels::from_candles(window),
        insufficient_data: false,
        candles: None,
    }
    .with_candles(candles)
}
