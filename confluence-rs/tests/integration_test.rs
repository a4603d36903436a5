//! Integration tests for confluence-rs

use confluence_rs::analysis::{analyze_timeframes, compute_timeframe_analysis, TimeframeAnalysis};
use confluence_rs::backtest::{backtest, BacktestOptions, BacktestReport, BacktestSummary, Trade};
use confluence_rs::config::{EngineConfig, FusionConfig, FusionProfile};
use confluence_rs::data::{Candle, CandleSeries};
use confluence_rs::dca::{calculate_dca_levels, DcaRequest};
use confluence_rs::decision::{fuse_decision, DecisionEngine, DecisionValidator, Signal};
use confluence_rs::error::{BacktestError, InvalidCandleSeriesError};
use confluence_rs::indicators::{Indicator, EMA, RSI};
use confluence_rs::types::PositionSide;
use std::collections::BTreeMap;

/// Helper function to create test candles
fn create_test_candles(count: usize, base_price: f64) -> Vec<Candle> {
    let mut candles = Vec::new();
    let mut prev = base_price;

    for i in 0..count {
        let price = base_price + (i as f64 * 0.1) + (i as f64 % 10.0) * 0.5;
        candles.push(Candle::new(
            i as i64 * 300_000,
            prev,
            prev.max(price) + 1.0,
            prev.min(price) - 1.0,
            price,
            1000.0 + (i % 5) as f64 * 100.0,
        ));
        prev = price;
    }

    candles
}

fn flat_candles(count: usize, price: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| Candle::new(i as i64 * 60_000, price, price, price, price, 1000.0))
        .collect()
}

#[test]
fn test_rsi_saturates_on_rising_series() {
    let mut rsi = RSI::new(14);
    for i in 0..40 {
        rsi.update(100.0 + i as f64);
    }
    assert!(rsi.is_ready());
    assert_eq!(rsi.value(), Some(100.0));
}

#[test]
fn test_rsi_neutral_on_constant_series() {
    let mut rsi = RSI::new(14);
    for _ in 0..15 {
        rsi.update(42.0);
    }
    assert_eq!(rsi.value(), Some(50.0));
}

#[test]
fn test_ema_seeded_with_sma() {
    let mut ema = EMA::new(4);
    for v in [2.0, 4.0, 6.0, 8.0] {
        ema.update(v);
    }
    assert_eq!(ema.value(), Some(5.0));
}

#[test]
fn test_candle_series_rejects_bad_input() {
    let mut candles = create_test_candles(5, 100.0);
    candles[3].time = candles[2].time;
    assert!(matches!(
        CandleSeries::new(candles),
        Err(InvalidCandleSeriesError::OutOfOrder { index: 3, .. })
    ));
}

#[test]
fn test_single_timeframe_fusion() {
    let mut analyses = BTreeMap::new();
    analyses.insert("1w".to_string(), TimeframeAnalysis::with_confidence("1w", 0.9));

    let decision = fuse_decision(&analyses, 100.0, 1, 15);
    assert!((decision.confidence - 0.9).abs() < 1e-9);
    assert_eq!(decision.signal, Signal::Buy);
    assert!(DecisionValidator::validate(&decision, &FusionConfig::default()));
}

#[test]
fn test_fused_confidence_never_leaves_unit_range() {
    for confidence in [-1.0, 0.0, 0.3, 0.7, 1.0, 2.5] {
        let mut analyses = BTreeMap::new();
        analyses.insert("1h".to_string(), TimeframeAnalysis::with_confidence("1h", confidence));
        analyses.insert("4h".to_string(), TimeframeAnalysis::with_confidence("4h", confidence));

        let decision = fuse_decision(&analyses, 100.0, 1, 15);
        assert!((0.0..=1.0).contains(&decision.confidence));
        assert!((1..=15).contains(&decision.leverage));
    }
}

#[test]
fn test_end_to_end_decision() {
    let mut inputs = BTreeMap::new();
    inputs.insert("15m".to_string(), create_test_candles(120, 100.0));
    inputs.insert("1h".to_string(), create_test_candles(80, 100.0));
    inputs.insert("1d".to_string(), create_test_candles(20, 100.0));

    let analyses = analyze_timeframes(&inputs);
    assert!(analyses["1d"].insufficient_data);
    assert!(!analyses["15m"].insufficient_data);

    let price = inputs["15m"].last().map(|c| c.close).unwrap();
    let config = FusionConfig::profile(FusionProfile::HighLeverage);
    let decision = DecisionEngine::new(config.clone()).fuse(&analyses, price);

    assert!(DecisionValidator::validate(&decision, &config));
    assert_ne!(decision.dominant_timeframe, "1d");
    assert!(!decision.reasoning.is_empty());
    assert!(decision.market_condition.is_some());
}

#[test]
fn test_analysis_serializes_without_candles() {
    let analysis = compute_timeframe_analysis(&create_test_candles(60, 100.0), "1h");
    let json = serde_json::to_value(&analysis).unwrap();
    assert!(json.get("candles").is_none());
    assert_eq!(json["timeframe"], "1h");
}

#[test]
fn test_flat_backtest() {
    let candles = flat_candles(60, 100.0);
    let result = backtest(&candles, 10_000.0, 1.0, 2.0, BacktestOptions::default()).unwrap();

    assert_eq!(result.summary.total_trades, 0);
    assert_eq!(result.summary.final_capital, 10_000.0);
    assert_eq!(result.summary.max_drawdown, 0.0);
}

#[test]
fn test_backtest_rejects_nan() {
    let mut candles = flat_candles(60, 100.0);
    candles[5].open = f64::NAN;
    let err = backtest(&candles, 10_000.0, 1.0, 2.0, BacktestOptions::default()).unwrap_err();
    assert!(matches!(err, BacktestError::InvalidSeries(_)));
}

#[test]
fn test_backtest_ledger_round_trip() {
    let candles = create_test_candles(400, 100.0);
    let result = backtest(&candles, 10_000.0, 3.0, 5.0, BacktestOptions::default()).unwrap();

    let rebuilt = BacktestSummary::from_trades(&result.trades, 10_000.0);
    assert_eq!(rebuilt, result.summary);
    assert_eq!(
        result.summary.winning_trades + result.summary.losing_trades,
        result.summary.total_trades
    );

    let report = BacktestReport::new(result);
    assert!(report.format().contains("Backtest Results"));
}

#[test]
fn test_profit_factor_sentinels() {
    let win = Trade::close(PositionSide::Long, 100.0, 0, 100.0, 110.0, 60_000, 1.0);
    let flat = Trade::close(PositionSide::Long, 100.0, 0, 100.0, 100.0, 60_000, 1.0);

    assert_eq!(BacktestSummary::from_trades(&[win], 1_000.0).profit_factor, f64::INFINITY);
    assert_eq!(BacktestSummary::from_trades(&[flat], 1_000.0).profit_factor, 0.0);
    assert_eq!(BacktestSummary::from_trades(&[], 1_000.0).profit_factor, 0.0);
}

#[test]
fn test_dca_long_ladder() {
    let request = DcaRequest::new(100.0, PositionSide::Long, 1.0, 3).with_volatility(0.01);
    let levels = calculate_dca_levels(&request);

    assert_eq!(levels.len(), 3);
    assert_eq!(levels.iter().map(|l| l.level).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert!(levels[0].price < 100.0);
    assert!(levels.windows(2).all(|w| w[1].price < w[0].price));
    assert!(levels.iter().all(|l| l.amount > 0.0));
}

#[test]
fn test_engine_config_json() {
    let config =
        EngineConfig::from_json_str(r#"{ "fusion": { "profile": "high_leverage" } }"#).unwrap();
    assert_eq!(config.fusion.profile, FusionProfile::HighLeverage);
    assert!(EngineConfig::from_json_str("{ not json").is_err());
}
