//! Market structure: swing points, trend and break of structure

use crate::data::Candle;
use crate::types::TrendBias;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Candles on each side a swing point must exceed
pub const SWING_SPAN: usize = 2;

/// Market structure and trap classification tags
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StructureTag {
    HigherHigh,
    HigherLow,
    LowerHigh,
    LowerLow,
    BreakOfStructureBullish,
    BreakOfStructureBearish,
    BullTrap,
    BearTrap,
    FakeoutUp,
    FakeoutDown,
}

impl StructureTag {
    /// Bias the tag argues for
    pub fn bias(self) -> TrendBias {
        match self {
            StructureTag::HigherHigh
            | StructureTag::HigherLow
            | StructureTag::BreakOfStructureBullish
            | StructureTag::BearTrap
            | StructureTag::FakeoutDown => TrendBias::Bullish,
            StructureTag::LowerHigh
            | StructureTag::LowerLow
            | StructureTag::BreakOfStructureBearish
            | StructureTag::BullTrap
            | StructureTag::FakeoutUp => TrendBias::Bearish,
        }
    }
}

impl fmt::Display for StructureTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StructureTag::HigherHigh => "HH",
            StructureTag::HigherLow => "HL",
            StructureTag::LowerHigh => "LH",
            StructureTag::LowerLow => "LL",
            StructureTag::BreakOfStructureBullish => "BOS_BULLISH",
            StructureTag::BreakOfStructureBearish => "BOS_BEARISH",
            StructureTag::BullTrap => "BULL_TRAP",
            StructureTag::BearTrap => "BEAR_TRAP",
            StructureTag::FakeoutUp => "FAKEOUT_UP",
            StructureTag::FakeoutDown => "FAKEOUT_DOWN",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    pub index: usize,
    pub price: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketStructure {
    pub trend: TrendBias,
    pub swing_highs: Vec<SwingPoint>,
    pub swing_lows: Vec<SwingPoint>,
    pub tags: BTreeSet<StructureTag>,
}

/// Swing highs and lows using a symmetric five-candle window
pub fn swing_points(candles: &[Candle]) -> (Vec<SwingPoint>, Vec<SwingPoint>) {
    let mut highs = Vec::new();
    let mut lows = Vec::new();
    if candles.len() < SWING_SPAN * 2 + 1 {
        return (highs, lows);
    }

    for i in SWING_SPAN..candles.len() - SWING_SPAN {
        let neighbours = (i - SWING_SPAN..=i + SWING_SPAN).filter(|&j| j != i);
        let c = &candles[i];
        if neighbours.clone().all(|j| c.high > candles[j].high) {
            highs.push(SwingPoint {
                index: i,
                price: c.high,
            });
        }
        if neighbours.clone().all(|j| c.low < candles[j].low) {
            lows.push(SwingPoint {
                index: i,
                price: c.low,
            });
        }
    }
    (highs, lows)
}

/// Classify trend from the latest swing points and flag breaks of structure.
///
/// Trend is bullish when the last two swing highs and the last two swing
/// lows are both rising, bearish when both are falling.
pub fn analyze_structure(candles: &[Candle]) -> MarketStructure {
    let Some(last) = candles.last() else {
        return MarketStructure::default();
    };
    let (swing_highs, swing_lows) = swing_points(candles);
    let mut tags = BTreeSet::new();

    let high_step = last_two(&swing_highs).map(|(prev, cur)| cur.price.total_cmp(&prev.price));
    let low_step = last_two(&swing_lows).map(|(prev, cur)| cur.price.total_cmp(&prev.price));

    match high_step {
        Some(std::cmp::Ordering::Greater) => {
            tags.insert(StructureTag::HigherHigh);
        }
        Some(std::cmp::Ordering::Less) => {
            tags.insert(StructureTag::LowerHigh);
        }
        _ => {}
    }
    match low_step {
        Some(std::cmp::Ordering::Greater) => {
            tags.insert(StructureTag::HigherLow);
        }
        Some(std::cmp::Ordering::Less) => {
            tags.insert(StructureTag::LowerLow);
        }
        _ => {}
    }

    let trend = if tags.contains(&StructureTag::HigherHigh)
        && tags.contains(&StructureTag::HigherLow)
    {
        TrendBias::Bullish
    } else if tags.contains(&StructureTag::LowerHigh) && tags.contains(&StructureTag::LowerLow) {
        TrendBias::Bearish
    } else {
        TrendBias::Neutral
    };

    if let Some(high) = swing_highs.last() {
        if last.close > high.price {
            tags.insert(StructureTag::BreakOfStructureBullish);
        }
    }
    if let Some(low) = swing_lows.last() {
        if last.close < low.price {
            tags.insert(StructureTag::BreakOfStructureBearish);
        }
    }

    MarketStructure {
        trend,
        swing_highs,
        swing_lows,
        tags,
    }
}

fn last_two(points: &[SwingPoint]) -> Option<(SwingPoint, SwingPoint)> {
    match points {
        [.., prev, cur] => Some((*prev, *cur)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Zig-zag series whose swings step by `drift` each leg
    fn zigzag(legs: usize, drift: f64) -> Vec<Candle> {
        let mut closes = Vec::new();
        let mut base = 100.0;
        for leg in 0..legs {
            let up = leg % 2 == 0;
            for _ in 0..4 {
                base += if up { 2.0 } else { -2.0 } + drift / 4.0;
                closes.push(base);
            }
        }
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| Candle::new(i as i64, c, c + 0.5, c - 0.5, c, 1.0))
            .collect()
    }

    #[test]
    fn test_swing_points() {
        let candles = zigzag(6, 0.0);
        let (highs, lows) = swing_points(&candles);
        assert!(!highs.is_empty());
        assert!(!lows.is_empty());
        for h in &highs {
            assert!(h.index >= SWING_SPAN && h.index < candles.len() - SWING_SPAN);
        }
    }

    #[test]
    fn test_rising_structure_is_bullish() {
        let structure = analyze_structure(&zigzag(8, 2.0));
        assert_eq!(structure.trend, TrendBias::Bullish);
        assert!(structure.tags.contains(&StructureTag::HigherHigh));
        assert!(structure.tags.contains(&StructureTag::HigherLow));
    }

    #[test]
    fn test_falling_structure_is_bearish() {
        let structure = analyze_structure(&zigzag(8, -2.0));
        assert_eq!(structure.trend, TrendBias::Bearish);
        assert!(structure.tags.contains(&StructureTag::LowerLow));
    }

    #[test]
    fn test_break_of_structure() {
        let mut candles = zigzag(6, 0.0);
        let high = swing_points(&candles).0.last().unwrap().price;
        let t = candles.len() as i64;
        candles.push(Candle::new(t, high, high + 6.0, high, high + 5.0, 1.0));
        let structure = analyze_structure(&candles);
        assert!(structure.tags.contains(&StructureTag::BreakOfStructureBullish));
    }

    #[test]
    fn test_short_input_is_neutral() {
        let structure = analyze_structure(&zigzag(1, 0.0)[..3]);
        assert_eq!(structure.trend, TrendBias::Neutral);
        assert!(structure.tags.is_empty());
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(StructureTag::BreakOfStructureBullish.to_string(), "BOS_BULLISH");
        assert_eq!(StructureTag::HigherLow.to_string(), "HL");
    }
}
