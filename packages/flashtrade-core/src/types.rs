//! Core data types for the Flashtrade simulator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A live quote for a single asset.
///
/// `high_24h`/`low_24h` are not kept in step with simulated prices, so
/// `low_24h <= price <= high_24h` may not hold after a few ticks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AssetQuote {
    /// Asset ticker symbol
    pub symbol: String,
    /// Last price
    pub price: f64,
    /// Absolute change since the previous price
    pub change: f64,
    /// Change as a percentage of the previous price
    pub change_percent: f64,
    /// 24h traded volume
    pub volume: f64,
    /// 24h high
    pub high_24h: f64,
    /// 24h low
    pub low_24h: f64,
    /// When the quote was last updated
    pub timestamp: DateTime<Utc>,
}

impl AssetQuote {
    /// Create a quote with no change recorded yet.
    pub fn new(symbol: &str, price: f64) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            price,
            change: 0.0,
            change_percent: 0.0,
            volume: 0.0,
            high_24h: price,
            low_24h: price,
            timestamp: Utc::now(),
        }
    }
}

/// Trade direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Buy => write!(f, "buy"),
            TradeSide::Sell => write!(f, "sell"),
        }
    }
}

/// Whether a trade is still open.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Open,
    Closed,
}

/// A single simulated trade.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trade {
    /// Trade identifier
    pub trade_id: String,
    /// Session the trade belongs to
    pub session_id: String,
    /// When the trade was submitted
    pub timestamp: DateTime<Utc>,
    /// Asset symbol
    pub asset: String,
    /// Buy or Sell
    pub side: TradeSide,
    /// Units traded
    pub quantity: f64,
    /// Entry price per unit
    pub price: f64,
    /// Realized P&L, zero while open
    pub profit_loss: f64,
    /// Why the trade was entered
    pub entry_reason: String,
    /// Why the trade was closed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_reason: Option<String>,
    /// Open or closed
    pub status: TradeStatus,
}

impl Trade {
    /// Create a new open trade.
    pub fn new(
        session_id: &str,
        asset: &str,
        side: TradeSide,
        quantity: f64,
        price: f64,
        entry_reason: impl Into<String>,
    ) -> Self {
        Self {
            trade_id: format!("trade_{}", uuid::Uuid::new_v4().simple()),
            session_id: session_id.to_string(),
            timestamp: Utc::now(),
            asset: asset.to_uppercase(),
            side,
            quantity,
            price,
            profit_loss: 0.0,
            entry_reason: entry_reason.into(),
            exit_reason: None,
            status: TradeStatus::Open,
        }
    }

    /// Total value of the trade at entry.
    pub fn cost(&self) -> f64 {
        self.quantity * self.price
    }

    /// Whether the trade is still open.
    pub fn is_open(&self) -> bool {
        self.status == TradeStatus::Open
    }
}

/// Lifecycle status stored on a session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Paused,
    Completed,
}

/// Kind of practice session; selects the configuration preset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionType {
    #[default]
    Practice,
    Tutorial,
    Challenge,
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionType::Practice => write!(f, "practice"),
            SessionType::Tutorial => write!(f, "tutorial"),
            SessionType::Challenge => write!(f, "challenge"),
        }
    }
}

/// A bounded practice interval with its own starting balance and trades.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeSession {
    /// Session identifier
    pub session_id: String,
    /// Owning user
    pub user_id: String,
    /// When the session started
    pub start_time: DateTime<Utc>,
    /// When the session completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    /// Balance at start
    pub virtual_currency_start: f64,
    /// Balance at completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub virtual_currency_end: Option<f64>,
    /// Trades in submission order
    pub trades_executed: Vec<Trade>,
    /// Current status
    pub status: SessionStatus,
    /// Preset used
    pub session_type: SessionType,
}

impl TradeSession {
    /// Create a new active session.
    pub fn new(user_id: &str, session_type: SessionType, starting_balance: f64) -> Self {
        Self {
            session_id: format!("session_{}", uuid::Uuid::new_v4().simple()),
            user_id: user_id.to_string(),
            start_time: Utc::now(),
            end_time: None,
            virtual_currency_start: starting_balance,
            virtual_currency_end: None,
            trades_executed: Vec::new(),
            status: SessionStatus::Active,
            session_type,
        }
    }

    /// Trades that have not been closed yet.
    pub fn open_trades(&self) -> impl Iterator<Item = &Trade> {
        self.trades_executed.iter().filter(|t| t.is_open())
    }
}

/// Kind of learning content.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ModuleType {
    Lesson,
    Quiz,
    Interactive,
}

/// Skill module difficulty.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// A unit of learning content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillModule {
    /// Module identifier
    pub module_id: String,
    /// Display title
    pub title: String,
    /// Body text
    pub content: String,
    /// Lesson, quiz or interactive
    pub module_type: ModuleType,
    /// Difficulty level
    pub difficulty: Difficulty,
    /// Estimated time in minutes
    pub estimated_minutes: u32,
    /// Modules that must be completed first
    pub prerequisites: Vec<String>,
    /// Aggregate completion rate across users
    pub completion_rate: f64,
}

/// OHLC candle built from simulated ticks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ChartPoint {
    /// Candle open time
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// API response wrapper for success cases.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    /// Create a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            ok: true,
            data: Some(data),
            error: None,
        }
    }

    /// Create an error response.
    pub fn err(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(error.into()),
        }
    }
}
