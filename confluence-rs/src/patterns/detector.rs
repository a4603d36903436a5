//! Candlestick pattern detection and significance scoring

use crate::data::Candle;
use crate::patterns::{PatternKind, PatternResult};
use crate::types::TrendBias;
use tracing::debug;

/// Patterns at or below this significance are ignored by callers
pub const SIGNIFICANCE_THRESHOLD: f64 = 60.0;

/// How many significant patterns callers keep
pub const MAX_SIGNIFICANT_PATTERNS: usize = 3;

/// Candles preceding a pattern used to judge the prevailing trend
pub const TREND_LOOKBACK: usize = 10;

const TREND_CHANGE_THRESHOLD: f64 = 0.01;
const REVERSAL_BONUS: f64 = 10.0;
const VOLUME_BONUS: f64 = 10.0;
const VOLUME_SPIKE: f64 = 1.5;

const DOJI_BODY_RATIO: f64 = 0.1;
const SMALL_BODY_RATIO: f64 = 0.3;
const LARGE_BODY_RATIO: f64 = 0.5;
const HAMMER_BODY_RATIO: f64 = 0.35;
const LONG_SHADOW_RATIO: f64 = 0.6;
const SHORT_SHADOW_RATIO: f64 = 0.1;
const TWEEZER_TOLERANCE: f64 = 0.001;

fn is_doji(c: &Candle) -> bool {
    c.range() > 0.0 && c.body_size() <= c.range() * DOJI_BODY_RATIO
}

fn is_large(c: &Candle) -> bool {
    c.range() > 0.0 && c.body_size() >= c.range() * LARGE_BODY_RATIO
}

fn is_spinning_top(c: &Candle) -> bool {
    let (body, range) = (c.body_size(), c.range());
    range > 0.0
        && body > range * DOJI_BODY_RATIO
        && body <= range * SMALL_BODY_RATIO
        && c.upper_wick() > body
        && c.lower_wick() > body
}

fn has_hammer_shape(c: &Candle) -> bool {
    let (body, range) = (c.body_size(), c.range());
    range > 0.0
        && body <= range * HAMMER_BODY_RATIO
        && c.lower_wick() >= body * 2.0
        && c.lower_wick() >= range * LONG_SHADOW_RATIO
        && c.upper_wick() <= range * SHORT_SHADOW_RATIO
}

fn has_inverted_hammer_shape(c: &Candle) -> bool {
    let (body, range) = (c.body_size(), c.range());
    range > 0.0
        && body <= range * HAMMER_BODY_RATIO
        && c.upper_wick() >= body * 2.0
        && c.upper_wick() >= range * LONG_SHADOW_RATIO
        && c.lower_wick() <= range * SHORT_SHADOW_RATIO
}

fn body_midpoint(c: &Candle) -> f64 {
    (c.open + c.close) / 2.0
}

/// Direction of closes over the [`TREND_LOOKBACK`] candles before `first`.
///
/// A move beyond ±1% is directional; fewer than two candles is neutral.
pub fn prevailing_trend(candles: &[Candle], first: usize) -> TrendBias {
    let end = first.min(candles.len());
    let start = end.saturating_sub(TREND_LOOKBACK);
    let window = &candles[start..end];
    let (Some(from), Some(to)) = (window.first(), window.last()) else {
        return TrendBias::Neutral;
    };
    if window.len() < 2 || from.close == 0.0 {
        return TrendBias::Neutral;
    }
    let change = (to.close - from.close) / from.close;
    if change > TREND_CHANGE_THRESHOLD {
        TrendBias::Bullish
    } else if change < -TREND_CHANGE_THRESHOLD {
        TrendBias::Bearish
    } else {
        TrendBias::Neutral
    }
}

fn single_candle(c: &Candle, prevailing: TrendBias) -> Vec<(PatternKind, TrendBias)> {
    let mut found = Vec::new();
    if is_doji(c) {
        found.push((PatternKind::Doji, TrendBias::Neutral));
    }
    if is_spinning_top(c) {
        found.push((PatternKind::SpinningTop, TrendBias::Neutral));
    }
    if has_hammer_shape(c) {
        let kind = if prevailing == TrendBias::Bullish {
            PatternKind::HangingMan
        } else {
            PatternKind::Hammer
        };
        found.push((kind, kind.bias()));
    }
    if has_inverted_hammer_shape(c) {
        let kind = if prevailing == TrendBias::Bullish {
            PatternKind::ShootingStar
        } else {
            PatternKind::InvertedHammer
        };
        found.push((kind, kind.bias()));
    }
    found
}

fn two_candle(p: &Candle, c: &Candle) -> Vec<(PatternKind, TrendBias)> {
    let mut found = Vec::new();

    if p.is_bearish()
        && c.is_bullish()
        && c.open <= p.close
        && c.close >= p.open
        && c.body_size() > p.body_size()
    {
        found.push((PatternKind::BullishEngulfing, TrendBias::Bullish));
    }
    if p.is_bullish()
        && c.is_bearish()
        && c.open >= p.close
        && c.close <= p.open
        && c.body_size() > p.body_size()
    {
        found.push((PatternKind::BearishEngulfing, TrendBias::Bearish));
    }

    let inside_body = c.body_top() < p.body_top() && c.body_bottom() > p.body_bottom();
    if is_large(p) && inside_body {
        if is_doji(c) {
            let bias = if p.is_bullish() {
                TrendBias::Bearish
            } else {
                TrendBias::Bullish
            };
            found.push((PatternKind::HaramiCross, bias));
        } else if p.is_bearish() && c.is_bullish() {
            found.push((PatternKind::BullishHarami, TrendBias::Bullish));
        } else if p.is_bullish() && c.is_bearish() {
            found.push((PatternKind::BearishHarami, TrendBias::Bearish));
        }
    }

    if c.high < p.high && c.low > p.low {
        found.push((PatternKind::InsideBar, TrendBias::Neutral));
    }

    if p.is_bullish()
        && c.is_bearish()
        && (p.high - c.high).abs() <= p.high.abs() * TWEEZER_TOLERANCE
    {
        found.push((PatternKind::TweezerTop, TrendBias::Bearish));
    }
    if p.is_bearish()
        && c.is_bullish()
        && (p.low - c.low).abs() <= p.low.abs() * TWEEZER_TOLERANCE
    {
        found.push((PatternKind::TweezerBottom, TrendBias::Bullish));
    }

    let mid = body_midpoint(p);
    if p.is_bearish()
        && is_large(p)
        && c.is_bullish()
        && c.open < p.close
        && c.close > mid
        && c.close < p.open
    {
        found.push((PatternKind::PiercingLine, TrendBias::Bullish));
    }
    if p.is_bullish()
        && is_large(p)
        && c.is_bearish()
        && c.open > p.close
        && c.close < mid
        && c.close > p.open
    {
        found.push((PatternKind::DarkCloudCover, TrendBias::Bearish));
    }
    found
}

fn three_candle(a: &Candle, b: &Candle, c: &Candle) -> Vec<(PatternKind, TrendBias)> {
    let mut found = Vec::new();
    let mid = body_midpoint(a);
    let small_star = b.body_size() <= a.body_size() * SMALL_BODY_RATIO;

    if a.is_bearish()
        && is_large(a)
        && small_star
        && b.body_top() < mid
        && c.is_bullish()
        && c.close > mid
    {
        found.push((PatternKind::MorningStar, TrendBias::Bullish));
    }
    if a.is_bullish()
        && is_large(a)
        && small_star
        && b.body_bottom() > mid
        && c.is_bearish()
        && c.close < mid
    {
        found.push((PatternKind::EveningStar, TrendBias::Bearish));
    }

    let soldiers = [a, b, c].iter().all(|x| x.is_bullish() && is_large(x))
        && [(a, b), (b, c)]
            .iter()
            .all(|(prev, cur)| {
                cur.close > prev.close && cur.open > prev.open && cur.open <= prev.close
            });
    if soldiers {
        found.push((PatternKind::ThreeWhiteSoldiers, TrendBias::Bullish));
    }

    let crows = [a, b, c].iter().all(|x| x.is_bearish() && is_large(x))
        && [(a, b), (b, c)]
            .iter()
            .all(|(prev, cur)| {
                cur.close < prev.close && cur.open < prev.open && cur.open >= prev.close
            });
    if crows {
        found.push((PatternKind::ThreeBlackCrows, TrendBias::Bearish));
    }
    found
}

fn score(
    candles: &[Candle],
    kind: PatternKind,
    trend: TrendBias,
    first: usize,
    end: usize,
    prevailing: TrendBias,
) -> PatternResult {
    let mut significance = kind.base_weight();
    if trend.opposes(prevailing) {
        significance += REVERSAL_BONUS;
    }
    if end >= 1 && candles[end].volume > candles[end - 1].volume * VOLUME_SPIKE {
        significance += VOLUME_BONUS;
    }

    PatternResult {
        pattern: kind,
        significance: significance.clamp(0.0, 100.0),
        trend,
        candle_indices: (first..=end).collect(),
        description: kind.description().to_string(),
    }
}

fn scan(candles: &[Candle], from: usize) -> Vec<PatternResult> {
    let mut results = Vec::new();

    for end in from..candles.len() {
        let c = &candles[end];

        let prevailing = prevailing_trend(candles, end);
        for (kind, trend) in single_candle(c, prevailing) {
            results.push(score(candles, kind, trend, end, end, prevailing));
        }

        if end >= 1 {
            let first = end - 1;
            let prevailing = prevailing_trend(candles, first);
            for (kind, trend) in two_candle(&candles[first], c) {
                results.push(score(candles, kind, trend, first, end, prevailing));
            }
        }

        if end >= 2 {
            let first = end - 2;
            let prevailing = prevailing_trend(candles, first);
            for (kind, trend) in three_candle(&candles[first], &candles[first + 1], c) {
                results.push(score(candles, kind, trend, first, end, prevailing));
            }
        }
    }

    results.sort_by(|a, b| {
        b.significance
            .total_cmp(&a.significance)
            .then_with(|| b.end_index().cmp(&a.end_index()))
    });
    debug!("Detected {} candlestick patterns", results.len());
    results
}

/// Scan the whole array; results sorted by descending significance.
pub fn detect_patterns(candles: &[Candle]) -> Vec<PatternResult> {
    scan(candles, 0)
}

/// Only patterns ending within the last `lookback` candles.
pub fn detect_recent_patterns(candles: &[Candle], lookback: usize) -> Vec<PatternResult> {
    scan(candles, candles.len().saturating_sub(lookback))
}

/// Patterns above [`SIGNIFICANCE_THRESHOLD`], at most [`MAX_SIGNIFICANT_PATTERNS`].
///
/// Expects input already sorted by descending significance.
pub fn significant_patterns(patterns: &[PatternResult]) -> Vec<PatternResult> {
    patterns
        .iter()
        .filter(|p| p.significance > SIGNIFICANCE_THRESHOLD)
        .take(MAX_SIGNIFICANT_PATTERNS)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(t: i64, open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle::new(t, open, high, low, close, 100.0)
    }

    fn find(results: &[PatternResult], kind: PatternKind) -> Option<&PatternResult> {
        results.iter().find(|r| r.pattern == kind)
    }

    fn downtrend() -> Vec<Candle> {
        (0..10)
            .map(|i| {
                let open = 110.0 - i as f64;
                let close = open - 1.0;
                c(i, open, open + 0.2, close - 0.2, close)
            })
            .collect()
    }

    #[test]
    fn test_hammer_after_decline_gets_bonuses() {
        let mut candles = downtrend();
        let mut hammer = c(10, 100.0, 100.6, 97.0, 100.5);
        hammer.volume = 200.0;
        candles.push(hammer);

        let results = detect_recent_patterns(&candles, 1);
        let found = find(&results, PatternKind::Hammer).expect("hammer");
        assert_eq!(found.trend, TrendBias::Bullish);
        assert_eq!(found.candle_indices, vec![10]);
        assert_eq!(found.significance, 85.0);
    }

    #[test]
    fn test_hanging_man_after_advance() {
        let mut candles: Vec<Candle> = (0..10)
            .map(|i| {
                let open = 100.0 + i as f64;
                c(i, open, open + 1.2, open - 0.2, open + 1.0)
            })
            .collect();
        candles.push(c(10, 110.0, 110.1, 107.0, 109.8));
        let results = detect_recent_patterns(&candles, 1);
        assert!(find(&results, PatternKind::HangingMan).is_some());
        assert!(find(&results, PatternKind::Hammer).is_none());
    }

    #[test]
    fn test_bullish_engulfing() {
        let candles = vec![c(0, 100.0, 100.5, 97.5, 98.0), c(1, 97.8, 101.2, 97.6, 101.0)];
        let results = detect_patterns(&candles);
        let found = find(&results, PatternKind::BullishEngulfing).expect("engulfing");
        assert_eq!(found.candle_indices, vec![0, 1]);
        assert_eq!(found.significance, 75.0);
    }

    #[test]
    fn test_morning_star() {
        let candles = vec![
            c(0, 105.0, 105.5, 99.5, 100.0),
            c(1, 99.5, 100.2, 99.0, 99.8),
            c(2, 100.0, 104.2, 99.8, 104.0),
        ];
        let results = detect_patterns(&candles);
        let found = find(&results, PatternKind::MorningStar).expect("morning star");
        assert_eq!(found.candle_indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_three_white_soldiers_ranks_first() {
        let candles = vec![
            c(0, 100.0, 102.2, 99.9, 102.0),
            c(1, 101.0, 103.6, 100.9, 103.5),
            c(2, 102.5, 105.1, 102.4, 105.0),
        ];
        let results = detect_patterns(&candles);
        assert_eq!(results[0].pattern, PatternKind::ThreeWhiteSoldiers);
        assert_eq!(results[0].significance, 90.0);
    }

    #[test]
    fn test_doji_and_inside_bar() {
        let candles = vec![c(0, 100.0, 102.0, 98.0, 101.5), c(1, 100.0, 101.0, 99.0, 100.05)];
        let results = detect_patterns(&candles);
        assert!(find(&results, PatternKind::Doji).is_some());
        assert!(find(&results, PatternKind::InsideBar).is_some());
    }

    #[test]
    fn test_results_sorted_and_filtered() {
        let mut candles = downtrend();
        candles.push(c(10, 99.0, 99.1, 96.0, 96.2));
        candles.push(c(11, 96.0, 100.0, 95.9, 99.8));
        let results = detect_patterns(&candles);
        for pair in results.windows(2) {
            assert!(pair[0].significance >= pair[1].significance);
        }
        let top = significant_patterns(&results);
        assert!(top.len() <= MAX_SIGNIFICANT_PATTERNS);
        assert!(top.iter().all(|p| p.significance > SIGNIFICANCE_THRESHOLD));
    }

    #[test]
    fn test_prevailing_trend() {
        let candles = downtrend();
        assert_eq!(prevailing_trend(&candles, 10), TrendBias::Bearish);
        assert_eq!(prevailing_trend(&candles, 1), TrendBias::Neutral);
        assert_eq!(prevailing_trend(&[], 0), TrendBias::Neutral);
    }
}
