//! Trade history statistics.

use crate::types::Trade;
use serde::{Deserialize, Serialize};

/// How a trade turned out.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TradeOutcome {
    Win,
    Loss,
    Neutral,
}

impl TradeOutcome {
    /// Classify a trade by its recorded P&L.
    pub fn of(trade: &Trade) -> Self {
        if trade.profit_loss > 0.0 {
            TradeOutcome::Win
        } else if trade.profit_loss < 0.0 {
            TradeOutcome::Loss
        } else {
            TradeOutcome::Neutral
        }
    }
}

/// Aggregate results over a list of trades.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistorySummary {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub total_pnl: f64,
    /// Winning trades as a percentage of all trades
    pub win_rate_percent: f64,
    pub average_pnl: f64,
}

impl HistorySummary {
    /// Summarize `trades`. Open trades count with their zero P&L.
    pub fn from_trades(trades: &[Trade]) -> Self {
        let total_trades = trades.len();
        let winning_trades = trades
            .iter()
            .filter(|t| TradeOutcome::of(t) == TradeOutcome::Win)
            .count();
        let losing_trades = trades
            .iter()
            .filter(|t| TradeOutcome::of(t) == TradeOutcome::Loss)
            .count();
        let total_pnl: f64 = trades.iter().map(|t| t.profit_loss).sum();

        let win_rate_percent = if total_trades > 0 {
            (winning_trades as f64 / total_trades as f64) * 100.0
        } else {
            0.0
        };

        Self {
            total_trades,
            winning_trades,
            losing_trades,
            total_pnl,
            win_rate_percent,
            average_pnl: total_pnl / total_trades.max(1) as f64,
        }
    }
}
