//! Candlestick pattern catalog

use crate::types::TrendBias;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Recognised candlestick patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternKind {
    // single candle
    Doji,
    SpinningTop,
    Hammer,
    InvertedHammer,
    ShootingStar,
    HangingMan,
    // two candles
    BullishEngulfing,
    BearishEngulfing,
    BullishHarami,
    BearishHarami,
    HaramiCross,
    InsideBar,
    TweezerTop,
    TweezerBottom,
    PiercingLine,
    DarkCloudCover,
    // three candles
    MorningStar,
    EveningStar,
    ThreeWhiteSoldiers,
    ThreeBlackCrows,
}

impl PatternKind {
    /// Base significance before reversal and volume bonuses
    pub fn base_weight(self) -> f64 {
        match self {
            PatternKind::SpinningTop => 35.0,
            PatternKind::Doji => 40.0,
            PatternKind::InsideBar => 45.0,
            PatternKind::InvertedHammer => 55.0,
            PatternKind::BullishHarami | PatternKind::BearishHarami => 55.0,
            PatternKind::HangingMan => 60.0,
            PatternKind::HaramiCross => 60.0,
            PatternKind::TweezerTop | PatternKind::TweezerBottom => 60.0,
            PatternKind::Hammer | PatternKind::ShootingStar => 65.0,
            PatternKind::PiercingLine | PatternKind::DarkCloudCover => 70.0,
            PatternKind::BullishEngulfing | PatternKind::BearishEngulfing => 75.0,
            PatternKind::MorningStar | PatternKind::EveningStar => 85.0,
            PatternKind::ThreeWhiteSoldiers | PatternKind::ThreeBlackCrows => 90.0,
        }
    }

    /// Inherent direction of the pattern; harami cross is resolved by the
    /// detector from the mother candle's direction.
    pub fn bias(self) -> TrendBias {
        match self {
            PatternKind::Hammer
            | PatternKind::InvertedHammer
            | PatternKind::BullishEngulfing
            | PatternKind::BullishHarami
            | PatternKind::TweezerBottom
            | PatternKind::PiercingLine
            | PatternKind::MorningStar
            | PatternKind::ThreeWhiteSoldiers => TrendBias::Bullish,
            PatternKind::ShootingStar
            | PatternKind::HangingMan
            | PatternKind::BearishEngulfing
            | PatternKind::BearishHarami
            | PatternKind::TweezerTop
            | PatternKind::DarkCloudCover
            | PatternKind::EveningStar
            | PatternKind::ThreeBlackCrows => TrendBias::Bearish,
            PatternKind::Doji
            | PatternKind::SpinningTop
            | PatternKind::HaramiCross
            | PatternKind::InsideBar => TrendBias::Neutral,
        }
    }

    /// Number of candles the pattern spans
    pub fn span(self) -> usize {
        match self {
            PatternKind::Doji
            | PatternKind::SpinningTop
            | PatternKind::Hammer
            | PatternKind::InvertedHammer
            | PatternKind::ShootingStar
            | PatternKind::HangingMan => 1,
            PatternKind::MorningStar
            | PatternKind::EveningStar
            | PatternKind::ThreeWhiteSoldiers
            | PatternKind::ThreeBlackCrows => 3,
            _ => 2,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PatternKind::Doji => "Open and close nearly equal, indecision",
            PatternKind::SpinningTop => "Small body with long shadows on both sides",
            PatternKind::Hammer => {
                "Long lower shadow after a decline, buyers rejected lower prices"
            }
            PatternKind::InvertedHammer => {
                "Long upper shadow after a decline, early buying pressure"
            }
            PatternKind::ShootingStar => {
                "Long upper shadow after an advance, sellers rejected higher prices"
            }
            PatternKind::HangingMan => {
                "Long lower shadow after an advance, selling pressure emerging"
            }
            PatternKind::BullishEngulfing => "Bullish body engulfs the prior bearish body",
            PatternKind::BearishEngulfing => "Bearish body engulfs the prior bullish body",
            PatternKind::BullishHarami => "Small bullish body inside the prior bearish body",
            PatternKind::BearishHarami => "Small bearish body inside the prior bullish body",
            PatternKind::HaramiCross => "Doji inside the prior large body",
            PatternKind::InsideBar => "Range contained within the prior candle's range",
            PatternKind::TweezerTop => "Matching highs with a bearish follow-through",
            PatternKind::TweezerBottom => "Matching lows with a bullish follow-through",
            PatternKind::PiercingLine => {
                "Bullish candle closes above the midpoint of the prior bearish body"
            }
            PatternKind::DarkCloudCover => {
                "Bearish candle closes below the midpoint of the prior bullish body"
            }
            PatternKind::MorningStar => "Bearish candle, small star, strong bullish close",
            PatternKind::EveningStar => "Bullish candle, small star, strong bearish close",
            PatternKind::ThreeWhiteSoldiers => "Three advancing bullish candles",
            PatternKind::ThreeBlackCrows => "Three declining bearish candles",
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PatternKind::Doji => "Doji",
            PatternKind::SpinningTop => "Spinning Top",
            PatternKind::Hammer => "Hammer",
            PatternKind::InvertedHammer => "Inverted Hammer",
            PatternKind::ShootingStar => "Shooting Star",
            PatternKind::HangingMan => "Hanging Man",
            PatternKind::BullishEngulfing => "Bullish Engulfing",
            PatternKind::BearishEngulfing => "Bearish Engulfing",
            PatternKind::BullishHarami => "Bullish Harami",
            PatternKind::BearishHarami => "Bearish Harami",
            PatternKind::HaramiCross => "Harami Cross",
            PatternKind::InsideBar => "Inside Bar",
            PatternKind::TweezerTop => "Tweezer Top",
            PatternKind::TweezerBottom => "Tweezer Bottom",
            PatternKind::PiercingLine => "Piercing Line",
            PatternKind::DarkCloudCover => "Dark Cloud Cover",
            PatternKind::MorningStar => "Morning Star",
            PatternKind::EveningStar => "Evening Star",
            PatternKind::ThreeWhiteSoldiers => "Three White Soldiers",
            PatternKind::ThreeBlackCrows => "Three Black Crows",
        };
        f.write_str(s)
    }
}

/// A detected pattern occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternResult {
    pub pattern: PatternKind,
    /// 0..=100
    pub significance: f64,
    pub trend: TrendBias,
    /// Indices of the candles forming the pattern, ascending
    pub candle_indices: Vec<usize>,
    pub description: String,
}

impl PatternResult {
    /// Index of the pattern's final candle
    pub fn end_index(&self) -> usize {
        self.candle_indices.last().copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weights_in_range() {
        let all = [
            PatternKind::Doji,
            PatternKind::SpinningTop,
            PatternKind::Hammer,
            PatternKind::ThreeWhiteSoldiers,
            PatternKind::InsideBar,
        ];
        for kind in all {
            let w = kind.base_weight();
            assert!((35.0..=90.0).contains(&w), "{kind} weight {w}");
        }
    }

    #[test]
    fn test_bias_and_span() {
        assert_eq!(PatternKind::MorningStar.bias(), TrendBias::Bullish);
        assert_eq!(PatternKind::DarkCloudCover.bias(), TrendBias::Bearish);
        assert_eq!(PatternKind::ThreeBlackCrows.span(), 3);
        assert_eq!(PatternKind::TweezerTop.span(), 2);
        assert_eq!(PatternKind::Hammer.span(), 1);
    }
}
