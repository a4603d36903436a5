//! Example: Backtesting the RSI/EMA strategy
//!
//! Settings come from the environment (or `.env`); Ctrl-C cancels the run.

use confluence_rs::backtest::{BacktestEngine, BacktestReport};
use confluence_rs::config::EngineConfig;
use confluence_rs::data::{Candle, CandleSeries};
use confluence_rs::Result;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn create_test_candles(count: usize, base_price: f64) -> Vec<Candle> {
    let mut candles = Vec::new();
    let mut prev = base_price;

    // Up then down, with a sawtooth for volatility
    for i in 0..count {
        let swing = (i as f64 * 0.35).sin() * 6.0;
        let trend = if i < count / 2 { 0.15 } else { -0.15 };
        let price = base_price + (i as f64 * trend) + swing;

        candles.push(Candle::new(
            1_700_000_000_000 + i as i64 * 300_000,
            prev,
            prev.max(price) + 0.8,
            prev.min(price) - 0.8,
            price,
            1000.0 + (i % 12) as f64 * 40.0,
        ));
        prev = price;
    }

    candles
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    println!("=== Confluence-RS Backtest Example ===\n");

    let config = EngineConfig::from_env()?;
    info!(
        "Initial capital {:.2}, leverage {}x, risk {}% per trade",
        config.backtest.initial_capital,
        config.backtest.leverage,
        config.backtest.risk_per_trade_pct
    );

    println!("Creating test candle data...");
    let series = CandleSeries::new(create_test_candles(2_000, 100.0))?;

    let token = CancellationToken::new();
    let engine = BacktestEngine::new(config.backtest).with_cancellation(token.clone());

    let ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Ctrl-C received, cancelling backtest");
            ctrl_c.cancel();
        }
    });

    println!("Running backtest...");
    let result = tokio::task::spawn_blocking(move || engine.run(series.candles())).await??;

    println!("\n=== Backtest Results ===");
    let report = BacktestReport::new(result);
    println!("{}", report.format());
    println!("{}", report.format_trades());

    Ok(())
}
