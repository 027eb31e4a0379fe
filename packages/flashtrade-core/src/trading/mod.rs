//! Trade validation, P&L and the session state machine.

mod history;
mod pnl;
mod session;
mod validator;

pub use history::{HistorySummary, TradeOutcome};
pub use pnl::{calculate_pnl, percentage_change, unrealized_pnl};
pub use session::{SessionPhase, SessionState, SessionSummary, TradeRequest};
pub use validator::{validate_trade, validate_trade_input, TradeRejection, TradeValidation};
