//! Per-timeframe technical analysis
//!
//! Each timeframe's candles are reduced to a [`TimeframeAnalysis`]; the
//! decision engine fuses those into one trading decision.

pub mod timeframe;

pub use timeframe::*;

use crate::data::{Candle, CandleSeries};
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::info;

/// Analyze a validated series
pub fn analyze_series(series: &CandleSeries, timeframe: &str) -> TimeframeAnalysis {
    compute_timeframe_analysis(series.candles(), timeframe)
}

/// Analyze every timeframe in parallel, keyed by timeframe label
pub fn analyze_timeframes(
    inputs: &BTreeMap<String, Vec<Candle>>,
) -> BTreeMap<String, TimeframeAnalysis> {
    let analyses: BTreeMap<String, TimeframeAnalysis> = inputs
        .par_iter()
        .map(|(timeframe, candles)| {
            (
                timeframe.clone(),
                compute_timeframe_analysis(candles, timeframe),
            )
        })
        .collect();

    let usable = analyses.values().filter(|a| !a.insufficient_data).count();
    info!(
        "Analyzed {} timeframes ({} with sufficient data)",
        analyses.len(),
        usable
    );
    analyses
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat(n: usize) -> Vec<Candle> {
        (0..n)
            .map(|i| Candle::new(i as i64 * 60_000, 100.0, 100.5, 99.5, 100.0, 1000.0))
            .collect()
    }

    #[test]
    fn test_analyze_timeframes_keys() {
        let mut inputs = BTreeMap::new();
        inputs.insert("1h".to_string(), flat(60));
        inputs.insert("4h".to_string(), flat(10));

        let analyses = analyze_timeframes(&inputs);
        assert_eq!(analyses.len(), 2);
        assert!(!analyses["1h"].insufficient_data);
        assert!(analyses["4h"].insufficient_data);
        assert_eq!(analyses["1h"].timeframe, "1h");
    }

    #[test]
    fn test_analyze_series() {
        let series = CandleSeries::new(flat(55)).unwrap();
        let analysis = analyze_series(&series, "15m");
        assert_eq!(analysis.rsi, 50.0);
        assert_eq!(analysis.ema_status, crate::types::TrendBias::Neutral);
        assert_eq!(analysis.price, 100.0);
    }
}
