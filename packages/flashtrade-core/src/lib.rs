//! Flashtrade Core - Practice trading with virtual currency.
//!
//! This crate provides the logic behind the Flashtrade practice app:
//!
//! - **Market simulation**: Mock quotes perturbed by a bounded random walk
//! - **Trade validation**: Quantity, price, balance and position-size checks
//! - **P&L**: Long and short profit/loss arithmetic
//! - **Sessions**: Virtual balance, trade list and session lifecycle
//! - **Learning**: Skill module catalog with prerequisite tracking
//!
//! # Example
//!
//! ```rust,no_run
//! use flashtrade_core::trading::{SessionState, TradeRequest};
//! use flashtrade_core::types::{SessionType, TradeSide};
//!
//! let mut state = SessionState::new();
//! state.start(SessionType::Practice).unwrap();
//!
//! let trade = state
//!     .submit_trade(TradeRequest::new("BTC", TradeSide::Buy, 0.01, 45000.0))
//!     .unwrap();
//! println!("Opened {} at ${}", trade.asset, trade.price);
//! println!("Balance: ${}", state.balance());
//! ```

pub mod config;
pub mod desk;
pub mod format;
pub mod learning;
pub mod market;
pub mod trading;
pub mod types;

// Re-export commonly used types
pub use types::{
    ApiResponse, AssetQuote, ChartPoint, Difficulty, ModuleType, SessionStatus, SessionType,
    SkillModule, Trade, TradeSession, TradeSide, TradeStatus,
};

// Re-export main functionality
pub use config::{FlashConfig, RiskLevel, SessionConfig, SessionPresets, SimulatorConfig};
pub use desk::TradingDesk;
pub use learning::{get_module, list_modules, LearningProgress, ModuleState, SKILL_MODULES};
pub use market::{generate_price_movement, MarketSimulator, SimulationTicker};
pub use trading::{
    calculate_pnl, percentage_change, validate_trade, validate_trade_input, HistorySummary,
    SessionPhase, SessionState, TradeRejection, TradeRequest, TradeValidation,
};

/// Error types for flashtrade-core operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Trade rejected: {0}")]
    Rejected(#[from] TradeRejection),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Trade not found: {0}")]
    TradeNotFound(String),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    #[error("Unknown module: {0}")]
    UnknownModule(String),
}

/// Result type for flashtrade-core operations.
pub type Result<T> = std::result::Result<T, Error>;
