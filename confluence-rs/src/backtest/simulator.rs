//! RSI/EMA backtest simulator

use crate::backtest::{BacktestSummary, Trade};
use crate::config::BacktestConfig;
use crate::data::{closes, validate_candles, Candle};
use crate::error::BacktestError;
use crate::indicators::{latest_ema, latest_rsi};
use crate::types::PositionSide;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Backtest result: summary statistics plus the trade ledger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestResult {
    #[serde(flatten)]
    pub summary: BacktestSummary,
    pub trades: Vec<Trade>,
}

impl BacktestResult {
    pub fn from_trades(trades: Vec<Trade>, initial_capital: f64) -> Self {
        Self {
            summary: BacktestSummary::from_trades(&trades, initial_capital),
            trades,
        }
    }
}

/// Indicator readings at one step
#[derive(Debug, Clone, Copy)]
struct StepSignals {
    rsi: f64,
    ema_fast: f64,
    ema_slow: f64,
}

impl StepSignals {
    fn compute(closes: &[f64], config: &BacktestConfig) -> Option<Self> {
        Some(Self {
            rsi: latest_rsi(closes, config.rsi_period)?,
            ema_fast: latest_ema(closes, config.ema_fast)?,
            ema_slow: latest_ema(closes, config.ema_slow)?,
        })
    }

    fn should_exit(&self, side: PositionSide, config: &BacktestConfig) -> bool {
        match side {
            PositionSide::Long => self.rsi > config.rsi_overbought || self.ema_fast < self.ema_slow,
            PositionSide::Short => self.rsi < config.rsi_oversold || self.ema_fast > self.ema_slow,
        }
    }

    fn entry(&self, config: &BacktestConfig) -> Option<PositionSide> {
        if self.rsi < config.rsi_oversold && self.ema_fast > self.ema_slow {
            Some(PositionSide::Long)
        } else if self.rsi > config.rsi_overbought && self.ema_fast < self.ema_slow {
            Some(PositionSide::Short)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum PositionState {
    Flat,
    InPosition {
        side: PositionSide,
        entry_price: f64,
        entry_time: i64,
        size: f64,
    },
}

/// Backtesting engine
#[derive(Debug, Clone, Default)]
pub struct BacktestEngine {
    config: BacktestConfig,
    cancellation: Option<CancellationToken>,
}

impl BacktestEngine {
    /// Create new backtest engine
    pub fn new(config: BacktestConfig) -> Self {
        Self {
            config,
            cancellation: None,
        }
    }

    /// Stop the run when `token` is cancelled; checked once per candle
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Run backtest
    pub fn run(&self, candles: &[Candle]) -> Result<BacktestResult, BacktestError> {
        validate_candles(candles)?;
        let cfg = &self.config;

        if candles.len() < cfg.warmup {
            warn!(
                "Backtest needs at least {} candles, got {}; returning empty result",
                cfg.warmup,
                candles.len()
            );
            return Ok(BacktestResult::from_trades(Vec::new(), cfg.initial_capital));
        }

        let window = cfg.window();
        let mut capital = cfg.initial_capital;
        let mut state = PositionState::Flat;
        let mut trades = Vec::new();

        for i in cfg.warmup..candles.len() {
            if self.is_cancelled() {
                warn!("Backtest cancelled at candle {}", i);
                return Err(BacktestError::Cancelled {
                    processed: i - cfg.warmup,
                });
            }

            let start = (i + 1).saturating_sub(window);
            let Some(signals) = StepSignals::compute(&closes(&candles[start..=i]), cfg) else {
                continue;
            };
            let candle = &candles[i];

            state = match state {
                PositionState::InPosition {
                    side,
                    entry_price,
                    entry_time,
                    size,
                } if signals.should_exit(side, cfg) => {
                    let trade = Trade::close(
                        side,
                        entry_price,
                        entry_time,
                        size,
                        candle.close,
                        candle.time,
                        cfg.leverage,
                    );
                    debug!(
                        "Exit {} at {:.4} (entry {:.4}): profit {:.4}",
                        side, candle.close, entry_price, trade.profit
                    );
                    capital += trade.profit;
                    if capital <= 0.0 {
                        warn!("Capital exhausted at candle {}; no further entries", i);
                    }
                    trades.push(trade);
                    PositionState::Flat
                }
                PositionState::Flat if capital <= 0.0 => PositionState::Flat,
                PositionState::Flat => match signals.entry(cfg) {
                    Some(side) => {
                        let size = capital * cfg.risk_per_trade_pct / 100.0;
                        debug!(
                            "Enter {} at {:.4}: rsi={:.2}, size={:.2}",
                            side, candle.close, signals.rsi, size
                        );
                        PositionState::InPosition {
                            side,
                            entry_price: candle.close,
                            entry_time: candle.time,
                            size,
                        }
                    }
                    None => PositionState::Flat,
                },
                holding => holding,
            };
        }

        if let (
            PositionState::InPosition {
                side,
                entry_price,
                entry_time,
                size,
            },
            Some(last),
        ) = (state, candles.last())
        {
            debug!("Closing open {} position at the last candle", side);
            trades.push(Trade::close(
                side,
                entry_price,
                entry_time,
                size,
                last.close,
                last.time,
                cfg.leverage,
            ));
        }

        let result = BacktestResult::from_trades(trades, cfg.initial_capital);
        info!(
            "Backtest complete: {} trades, win rate {:.2}%, final capital {:.2}",
            result.summary.total_trades, result.summary.win_rate, result.summary.final_capital
        );
        Ok(result)
    }
}

/// Strategy thresholds and cancellation for [`backtest`]
#[derive(Debug, Clone)]
pub struct BacktestOptions {
    pub rsi_oversold: f64,
    pub rsi_overbought: f64,
    pub cancellation: Option<CancellationToken>,
}

impl Default for BacktestOptions {
    fn default() -> Self {
        let defaults = BacktestConfig::default();
        Self {
            rsi_oversold: defaults.rsi_oversold,
            rsi_overbought: defaults.rsi_overbought,
            cancellation: None,
        }
    }
}

/// Run the RSI/EMA strategy over `candles`
pub fn backtest(
    candles: &[Candle],
    initial_capital: f64,
    leverage: f64,
    risk_per_trade_pct: f64,
    options: BacktestOptions,
) -> Result<BacktestResult, BacktestError> {
    let config = BacktestConfig {
        initial_capital,
        leverage,
        risk_per_trade_pct,
        rsi_oversold: options.rsi_oversold,
        rsi_overbought: options.rsi_overbought,
        ..BacktestConfig::default()
    };
    let mut engine = BacktestEngine::new(config);
    if let Some(token) = options.cancellation {
        engine = engine.with_cancellation(token);
    }
    engine.run(candles)
}
