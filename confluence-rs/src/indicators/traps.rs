//! Bull/bear trap and fakeout detection

use crate::data::Candle;
use crate::indicators::StructureTag;
use serde::{Deserialize, Serialize};

/// Trailing candles inspected for traps
pub const TRAP_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FakeoutDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapSignals {
    pub bull_trap: bool,
    pub bear_trap: bool,
    pub fakeout: Option<FakeoutDirection>,
}

impl TrapSignals {
    pub fn tags(&self) -> Vec<StructureTag> {
        let mut tags = Vec::new();
        if self.bull_trap {
            tags.push(StructureTag::BullTrap);
        }
        if self.bear_trap {
            tags.push(StructureTag::BearTrap);
        }
        match self.fakeout {
            Some(FakeoutDirection::Up) => tags.push(StructureTag::FakeoutUp),
            Some(FakeoutDirection::Down) => tags.push(StructureTag::FakeoutDown),
            None => {}
        }
        tags
    }
}

/// Inspect the last [`TRAP_WINDOW`] candles.
///
/// The first two candles define the reference range, the third is the
/// breakout candidate and the last two decide whether it failed.
pub fn detect_traps(candles: &[Candle]) -> TrapSignals {
    if candles.len() < TRAP_WINDOW {
        return TrapSignals::default();
    }
    let w = &candles[candles.len() - TRAP_WINDOW..];
    let range_high = w[0].high.max(w[1].high);
    let range_low = w[0].low.min(w[1].low);
    let (breakout, first, second) = (&w[2], &w[3], &w[4]);

    let bull_trap = breakout.close > range_high
        && first.close < breakout.close
        && second.close < first.close
        && second.close < range_high;
    let bear_trap = breakout.close < range_low
        && first.close > breakout.close
        && second.close > first.close
        && second.close > range_low;

    let up_excursion = breakout.high - range_high;
    let down_excursion = range_low - breakout.low;
    let back_below = first.close <= range_high || second.close <= range_high;
    let back_above = first.close >= range_low || second.close >= range_low;

    let fakeout_up = up_excursion > 0.0 && back_below;
    let fakeout_down = down_excursion > 0.0 && back_above;
    let fakeout = match (fakeout_up, fakeout_down) {
        (true, true) if down_excursion > up_excursion => Some(FakeoutDirection::Down),
        (true, _) => Some(FakeoutDirection::Up),
        (false, true) => Some(FakeoutDirection::Down),
        (false, false) => None,
    };

    TrapSignals {
        bull_trap,
        bear_trap,
        fakeout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(t: i64, open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle::new(t, open, high, low, close, 1.0)
    }

    #[test]
    fn test_bull_trap() {
        let candles = vec![
            c(0, 100.0, 101.0, 99.0, 100.5),
            c(1, 100.5, 101.0, 99.5, 100.0),
            c(2, 100.0, 103.0, 100.0, 102.5),
            c(3, 102.5, 102.6, 100.5, 101.0),
            c(4, 101.0, 101.2, 99.8, 100.2),
        ];
        let traps = detect_traps(&candles);
        assert!(traps.bull_trap);
        assert!(!traps.bear_trap);
        assert_eq!(traps.fakeout, Some(FakeoutDirection::Up));
        assert_eq!(traps.tags(), vec![StructureTag::BullTrap, StructureTag::FakeoutUp]);
    }

    #[test]
    fn test_bear_trap() {
        let candles = vec![
            c(0, 100.0, 101.0, 99.0, 99.5),
            c(1, 99.5, 100.5, 99.0, 100.0),
            c(2, 100.0, 100.0, 97.0, 97.5),
            c(3, 97.5, 99.5, 97.4, 99.0),
            c(4, 99.0, 100.2, 98.9, 99.8),
        ];
        let traps = detect_traps(&candles);
        assert!(traps.bear_trap);
        assert_eq!(traps.fakeout, Some(FakeoutDirection::Down));
    }

    #[test]
    fn test_sustained_breakout_is_not_a_trap() {
        let candles = vec![
            c(0, 100.0, 101.0, 99.0, 100.5),
            c(1, 100.5, 101.0, 99.5, 100.0),
            c(2, 100.0, 103.0, 100.0, 102.5),
            c(3, 102.5, 104.0, 102.0, 103.5),
            c(4, 103.5, 105.0, 103.0, 104.5),
        ];
        assert_eq!(detect_traps(&candles), TrapSignals::default());
    }

    #[test]
    fn test_short_input() {
        assert_eq!(detect_traps(&[]), TrapSignals::default());
    }
}
