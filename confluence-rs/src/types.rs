//! Shared enums used across indicators, analysis and decisions

use serde::{Deserialize, Serialize};
use std::fmt;

/// Directional bias of a trend, EMA alignment or pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendBias {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

impl TrendBias {
    /// +1 for bullish, -1 for bearish, 0 for neutral
    pub fn sign(self) -> f64 {
        match self {
            TrendBias::Bullish => 1.0,
            TrendBias::Bearish => -1.0,
            TrendBias::Neutral => 0.0,
        }
    }

    /// True when both biases are directional and point opposite ways
    pub fn opposes(self, other: TrendBias) -> bool {
        matches!(
            (self, other),
            (TrendBias::Bullish, TrendBias::Bearish) | (TrendBias::Bearish, TrendBias::Bullish)
        )
    }
}

impl fmt::Display for TrendBias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrendBias::Bullish => "bullish",
            TrendBias::Bearish => "bearish",
            TrendBias::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

/// Position side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    /// Long position
    Long,
    /// Short position
    Short,
}

impl PositionSide {
    /// Bias a position profits from
    pub fn bias(self) -> TrendBias {
        match self {
            PositionSide::Long => TrendBias::Bullish,
            PositionSide::Short => TrendBias::Bearish,
        }
    }
}

impl fmt::Display for PositionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionSide::Long => f.write_str("LONG"),
            PositionSide::Short => f.write_str("SHORT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposes() {
        assert!(TrendBias::Bullish.opposes(TrendBias::Bearish));
        assert!(TrendBias::Bearish.opposes(TrendBias::Bullish));
        assert!(!TrendBias::Bullish.opposes(TrendBias::Neutral));
        assert!(!TrendBias::Neutral.opposes(TrendBias::Neutral));
    }

    #[test]
    fn test_side_serde() {
        let json = serde_json::to_string(&PositionSide::Short).unwrap();
        assert_eq!(json, "\"SHORT\"");
        assert_eq!(PositionSide::Long.bias(), TrendBias::Bullish);
    }
}
