//! Backtest report generation

use crate::backtest::{BacktestResult, MetricsCalculator};
use chrono::{DateTime, Utc};

/// UTC minute resolution, raw millis when out of chrono's range
fn format_time(datetime: Option<DateTime<Utc>>, millis: i64) -> String {
    datetime
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| millis.to_string())
}

/// Backtest report
#[derive(Debug)]
pub struct BacktestReport {
    result: BacktestResult,
    expectancy: f64,
    avg_duration_minutes: f64,
}

impl BacktestReport {
    /// Create new report from result
    pub fn new(result: BacktestResult) -> Self {
        let expectancy = MetricsCalculator::expectancy(&result.summary);
        let avg_duration_minutes = MetricsCalculator::avg_trade_duration(&result.trades);

        Self {
            result,
            expectancy,
            avg_duration_minutes,
        }
    }

    /// Format report as string
    pub fn format(&self) -> String {
        let s = &self.result.summary;
        format!(
            r#"
Backtest Results
================
Initial Capital: ${:.2}
Final Capital: ${:.2}
Net Profit: ${:.2} ({:.2}%)
Total Return: {:.4}
Number of Trades: {}
Winning Trades: {}
Losing Trades: {}
Win Rate: {:.2}%
Average Profit: ${:.2}
Average Loss: ${:.2}
Profit Factor: {:.2}
Expectancy: ${:.2}
Average Trade Duration: {:.1} min
Maximum Drawdown: {:.2}%
Sharpe Ratio: {:.2}
"#,
            s.initial_capital,
            s.final_capital,
            s.net_profit,
            s.net_profit_percent,
            s.total_return,
            s.total_trades,
            s.winning_trades,
            s.losing_trades,
            s.win_rate,
            s.avg_profit,
            s.avg_loss,
            s.profit_factor,
            self.expectancy,
            self.avg_duration_minutes,
            s.max_drawdown,
            s.sharpe_ratio,
        )
    }

    /// Per-trade ledger, one line per trade
    pub fn format_trades(&self) -> String {
        self.result
            .trades
            .iter()
            .enumerate()
            .map(|(i, t)| {
                format!(
                    "#{:<3} {:<5} {} entry {:.4} -> {} exit {:.4} profit ${:.2} ({:.2}%)",
                    i + 1,
                    t.side,
                    format_time(t.entry_datetime(), t.entry_time),
                    t.entry_price,
                    format_time(t.exit_datetime(), t.exit_time),
                    t.exit_price,
                    t.profit,
                    t.profit_percentage
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Get result reference
    pub fn result(&self) -> &BacktestResult {
        &self.result
    }

    pub fn expectancy(&self) -> f64 {
        self.expectancy
    }
}
