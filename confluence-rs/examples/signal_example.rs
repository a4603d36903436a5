//! Example: Multi-timeframe decision with a DCA ladder

use confluence_rs::analysis::analyze_timeframes;
use confluence_rs::config::EngineConfig;
use confluence_rs::data::Candle;
use confluence_rs::dca::{DcaCalculator, DcaOptions, DcaRequest};
use confluence_rs::decision::{DecisionEngine, DecisionValidator, Signal};
use confluence_rs::types::PositionSide;
use confluence_rs::Result;
use std::collections::BTreeMap;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Synthetic candles for one timeframe; longer timeframes move more per candle
fn create_candles(count: usize, minutes: i64, drift: f64) -> Vec<Candle> {
    let mut prev = 100.0;
    (0..count)
        .map(|i| {
            let price = 100.0 + drift * i as f64 + (i as f64 * 0.5).sin() * drift * 4.0;
            let candle = Candle::new(
                1_700_000_000_000 + i as i64 * minutes * 60_000,
                prev,
                prev.max(price) + drift,
                prev.min(price) - drift,
                price,
                500.0 + (i % 9) as f64 * 75.0,
            );
            prev = price;
            candle
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = EngineConfig::from_env()?;
    info!("Using {:?} fusion profile", config.fusion.profile);

    let mut inputs = BTreeMap::new();
    inputs.insert("5m".to_string(), create_candles(200, 5, 0.05));
    inputs.insert("15m".to_string(), create_candles(200, 15, 0.1));
    inputs.insert("1h".to_string(), create_candles(150, 60, 0.2));
    inputs.insert("4h".to_string(), create_candles(100, 240, 0.4));
    inputs.insert("1d".to_string(), create_candles(40, 1440, 1.0));

    let analyses = analyze_timeframes(&inputs);
    for (timeframe, analysis) in &analyses {
        println!(
            "{:>4}: trend={:<8} rsi={:>6.2} confidence={:.3}{}",
            timeframe,
            analysis.trend,
            analysis.rsi,
            analysis.confidence,
            if analysis.insufficient_data { " (insufficient data)" } else { "" }
        );
    }

    let price = inputs["5m"].last().map(|c| c.close).unwrap_or_default();
    let engine = DecisionEngine::new(config.fusion.clone());
    let decision = engine.fuse(&analyses, price);

    println!("\n=== Decision ===");
    println!("{}", serde_json::to_string_pretty(&decision)?);
    println!(
        "Actionable at 0.7: {}",
        DecisionValidator::is_actionable(&decision, engine.config(), 0.7)
    );

    let side = match decision.signal {
        Signal::Buy => PositionSide::Long,
        Signal::Sell => PositionSide::Short,
        Signal::Neutral => return Ok(()),
    };

    let mut request = DcaRequest::new(price, side, 1.0, 4).with_options(DcaOptions {
        optimize: true,
        reinforcement: true,
        price_action: decision.signal.bias(),
        ..DcaOptions::default()
    });
    if let Some(condition) = decision.market_condition {
        request = request
            .with_volatility(condition.volatility)
            .with_market_condition(condition.regime);
    }

    println!("\n=== DCA Ladder ===");
    for level in DcaCalculator::new(config.dca).calculate(&request) {
        println!(
            "#{} price {:.4} amount {:.2} partial TP {:?}",
            level.level, level.price, level.amount, level.partial_take_profit
        );
    }

    Ok(())
}
