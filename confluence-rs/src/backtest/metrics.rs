//! Backtest performance metrics

use crate::types::PositionSide;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Closed trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    #[serde(rename = "type")]
    pub side: PositionSide,
    pub entry_price: f64,
    pub exit_price: f64,
    /// Margin committed at entry
    pub size: f64,
    /// Leveraged PnL
    pub profit: f64,
    /// PnL as a percentage of `size`
    pub profit_percentage: f64,
    /// Epoch milliseconds
    pub entry_time: i64,
    pub exit_time: i64,
}

impl Trade {
    /// Close a position at `exit_price`
    ///
    /// A loss never exceeds the committed margin; past that point the
    /// position is treated as liquidated.
    pub fn close(
        side: PositionSide,
        entry_price: f64,
        entry_time: i64,
        size: f64,
        exit_price: f64,
        exit_time: i64,
        leverage: f64,
    ) -> Self {
        let raw = if entry_price == 0.0 {
            0.0
        } else {
            size * (exit_price - entry_price) / entry_price * leverage
        };
        let profit = match side {
            PositionSide::Long => raw,
            PositionSide::Short => -raw,
        }
        .max(-size.abs());
        let profit_percentage = if size == 0.0 { 0.0 } else { profit / size * 100.0 };

        Self {
            side,
            entry_price,
            exit_price,
            size,
            profit,
            profit_percentage,
            entry_time,
            exit_time,
        }
    }

    pub fn is_win(&self) -> bool {
        self.profit > 0.0
    }

    /// Holding time in minutes
    pub fn duration_minutes(&self) -> f64 {
        (self.exit_time - self.entry_time) as f64 / 60_000.0
    }

    pub fn entry_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.entry_time)
    }

    pub fn exit_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.exit_time)
    }
}

/// Aggregate statistics of a trade ledger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BacktestSummary {
    pub total_trades: usize,
    pub winning_trades: usize,
    /// Every non-winning trade, break-even included
    pub losing_trades: usize,
    /// Percent of trades with positive profit
    pub win_rate: f64,
    pub initial_capital: f64,
    pub final_capital: f64,
    /// `final / initial - 1`
    pub total_return: f64,
    /// Largest peak-to-trough fall of capital at trade exits, in percent
    pub max_drawdown: f64,
    pub net_profit: f64,
    pub net_profit_percent: f64,
    /// Gross profit over gross loss; `inf` with profits and no losses, 0 with neither
    pub profit_factor: f64,
    pub avg_profit: f64,
    pub avg_loss: f64,
    pub sharpe_ratio: f64,
}

impl BacktestSummary {
    /// Derive every statistic from the ledger alone
    pub fn from_trades(trades: &[Trade], initial_capital: f64) -> Self {
        let total_trades = trades.len();
        let winning_trades = trades.iter().filter(|t| t.is_win()).count();
        let losing_trades = total_trades - winning_trades;

        let win_rate = if total_trades == 0 {
            0.0
        } else {
            winning_trades as f64 / total_trades as f64 * 100.0
        };

        let gross_profit: f64 = trades.iter().filter(|t| t.profit > 0.0).map(|t| t.profit).sum();
        let gross_loss: f64 = trades
            .iter()
            .filter(|t| t.profit < 0.0)
            .map(|t| -t.profit)
            .sum();
        let loss_count = trades.iter().filter(|t| t.profit < 0.0).count();

        let avg_profit = if winning_trades > 0 {
            gross_profit / winning_trades as f64
        } else {
            0.0
        };
        let avg_loss = if loss_count > 0 {
            -gross_loss / loss_count as f64
        } else {
            0.0
        };

        let mut capital = initial_capital;
        let mut peak = initial_capital;
        let mut max_drawdown = 0.0;
        for trade in trades {
            capital += trade.profit;
            if capital > peak {
                peak = capital;
            }
            if peak > 0.0 {
                let drawdown = (peak - capital) / peak;
                if drawdown > max_drawdown {
                    max_drawdown = drawdown;
                }
            }
        }

        let net_profit = capital - initial_capital;
        let (total_return, net_profit_percent) = if initial_capital != 0.0 {
            (
                capital / initial_capital - 1.0,
                net_profit / initial_capital * 100.0,
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            total_trades,
            winning_trades,
            losing_trades,
            win_rate,
            initial_capital,
            final_capital: capital,
            total_return,
            max_drawdown: max_drawdown * 100.0,
            net_profit,
            net_profit_percent,
            profit_factor: MetricsCalculator::profit_factor(gross_profit, gross_loss),
            avg_profit,
            avg_loss,
            sharpe_ratio: MetricsCalculator::sharpe_ratio(trades),
        }
    }
}

/// Metric formulas shared by the summary and the report
pub struct MetricsCalculator;

impl MetricsCalculator {
    /// Gross profit over gross loss (both positive)
    pub fn profit_factor(gross_profit: f64, gross_loss: f64) -> f64 {
        if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else if gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        }
    }

    /// Expected PnL per trade
    pub fn expectancy(summary: &BacktestSummary) -> f64 {
        if summary.total_trades == 0 {
            return 0.0;
        }
        (summary.win_rate / 100.0 * summary.avg_profit)
            - ((100.0 - summary.win_rate) / 100.0 * summary.avg_loss.abs())
    }

    /// Per-trade Sharpe ratio (mean over population std of trade returns)
    pub fn sharpe_ratio(trades: &[Trade]) -> f64 {
        if trades.len() < 2 {
            return 0.0;
        }
        let returns: Vec<f64> = trades.iter().map(|t| t.profit_percentage / 100.0).collect();
        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let variance =
            returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / returns.len() as f64;
        let std_dev = variance.sqrt();
        if std_dev > 0.0 {
            mean / std_dev
        } else {
            0.0
        }
    }

    /// Mean holding time in minutes
    pub fn avg_trade_duration(trades: &[Trade]) -> f64 {
        if trades.is_empty() {
            return 0.0;
        }
        trades.iter().map(Trade::duration_minutes).sum::<f64>() / trades.len() as f64
    }
}
