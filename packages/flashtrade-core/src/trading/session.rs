//! Practice session state machine.

use super::pnl::calculate_pnl;
use super::validator::{validate_trade, TradeRejection};
use crate::config::{FlashConfig, SessionConfig, SessionPresets, DEFAULT_BALANCE};
use crate::format::format_currency;
use crate::types::{SessionStatus, SessionType, Trade, TradeSession, TradeSide, TradeStatus};
use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle phase of the session holder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    #[default]
    Idle,
    Active,
    Paused,
    Completed,
}

/// An order as entered by the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TradeRequest {
    pub asset: String,
    pub side: TradeSide,
    pub quantity: f64,
    pub price: f64,
    /// Defaults to "`<side>` order at `<price>`"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_reason: Option<String>,
}

impl TradeRequest {
    /// Create a request with the default entry reason.
    pub fn new(asset: &str, side: TradeSide, quantity: f64, price: f64) -> Self {
        Self {
            asset: asset.to_uppercase(),
            side,
            quantity,
            price,
            entry_reason: None,
        }
    }

    /// Attach an entry reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.entry_reason = Some(reason.into());
        self
    }
}

/// Holds the virtual balance, the current session and its trades.
#[derive(Debug, Clone)]
pub struct SessionState {
    phase: SessionPhase,
    balance: f64,
    session: Option<TradeSession>,
    presets: SessionPresets,
    user_id: String,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::with_config(&FlashConfig::default())
    }
}

impl SessionState {
    /// Create an idle holder with the default presets.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an idle holder using the presets from `config`.
    pub fn with_config(config: &FlashConfig) -> Self {
        Self {
            phase: SessionPhase::Idle,
            balance: DEFAULT_BALANCE,
            session: None,
            presets: config.sessions.clone(),
            user_id: config.user_id.clone(),
        }
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Whether trades may be submitted and prices should tick.
    pub fn is_active(&self) -> bool {
        self.phase == SessionPhase::Active
    }

    /// Current virtual balance.
    pub fn balance(&self) -> f64 {
        self.balance
    }

    /// The current session, if one has been started since the last reset.
    pub fn session(&self) -> Option<&TradeSession> {
        self.session.as_ref()
    }

    /// Trades of the current session in submission order.
    pub fn trades(&self) -> &[Trade] {
        self.session
            .as_ref()
            .map(|s| s.trades_executed.as_slice())
            .unwrap_or(&[])
    }

    /// Preset of the current session.
    pub fn preset(&self) -> Option<&SessionConfig> {
        self.session
            .as_ref()
            .map(|s| self.presets.get(s.session_type))
    }

    /// Session presets in use.
    pub fn presets(&self) -> &SessionPresets {
        &self.presets
    }

    /// Start a new session of the given type.
    pub fn start(&mut self, session_type: SessionType) -> Result<&TradeSession> {
        if matches!(self.phase, SessionPhase::Active | SessionPhase::Paused) {
            return Err(Error::InvalidOperation(
                "Session already in progress. Reset current session first.".to_string(),
            ));
        }

        let starting_balance = self.presets.get(session_type).starting_balance;
        let session = TradeSession::new(&self.user_id, session_type, starting_balance);
        tracing::info!(
            "Started {} session {} with {}",
            session_type,
            session.session_id,
            format_currency(starting_balance)
        );

        self.balance = starting_balance;
        self.phase = SessionPhase::Active;
        Ok(&*self.session.insert(session))
    }

    /// Pause the active session.
    pub fn pause(&mut self) -> Result<()> {
        if self.phase != SessionPhase::Active {
            return Err(Error::InvalidOperation("No active session to pause".to_string()));
        }

        self.phase = SessionPhase::Paused;
        if let Some(session) = self.session.as_mut() {
            session.status = SessionStatus::Paused;
            tracing::info!("Paused session {}", session.session_id);
        }
        Ok(())
    }

    /// Resume a paused session.
    pub fn resume(&mut self) -> Result<()> {
        if self.phase != SessionPhase::Paused {
            return Err(Error::InvalidOperation("No paused session to resume".to_string()));
        }

        self.phase = SessionPhase::Active;
        if let Some(session) = self.session.as_mut() {
            session.status = SessionStatus::Active;
            tracing::info!("Resumed session {}", session.session_id);
        }
        Ok(())
    }

    /// Discard the current session and its trades.
    ///
    /// The balance always returns to the default 10000, even after a tutorial
    /// or challenge session.
    pub fn reset(&mut self) {
        if let Some(session) = self.session.take() {
            tracing::info!(
                "Reset session {} ({} trades discarded)",
                session.session_id,
                session.trades_executed.len()
            );
        }
        self.phase = SessionPhase::Idle;
        self.balance = DEFAULT_BALANCE;
    }

    /// End the session, recording the end time and final balance.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<&TradeSession> {
        if !matches!(self.phase, SessionPhase::Active | SessionPhase::Paused) {
            return Err(Error::InvalidOperation("No session to complete".to_string()));
        }

        let session = self
            .session
            .as_mut()
            .ok_or_else(|| Error::InvalidOperation("No session to complete".to_string()))?;
        session.status = SessionStatus::Completed;
        session.end_time = Some(now);
        session.virtual_currency_end = Some(self.balance);
        self.phase = SessionPhase::Completed;

        tracing::info!(
            "Completed session {} with {}",
            session.session_id,
            format_currency(self.balance)
        );
        Ok(&*session)
    }

    /// Time left before the session's preset duration runs out.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        let session = self.session.as_ref()?;
        let end = session.start_time + self.presets.get(session.session_type).duration();
        Some((end - now).max(Duration::zero()))
    }

    /// Whether the current session has outlived its preset duration.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.time_remaining(now)
            .map(|left| left <= Duration::zero())
            .unwrap_or(false)
    }

    /// Validate and record a new open trade.
    ///
    /// Buys deduct `quantity * price` from the balance, sells add it.
    pub fn submit_trade(&mut self, request: TradeRequest) -> Result<Trade> {
        if self.phase != SessionPhase::Active {
            return Err(Error::InvalidOperation("No active trading session".to_string()));
        }

        let preset = self
            .preset()
            .ok_or_else(|| Error::InvalidOperation("No active trading session".to_string()))?;

        if !preset.allows(&request.asset) {
            return Err(Error::InvalidOperation(format!(
                "{} is not tradable in this session",
                request.asset.to_uppercase()
            )));
        }

        let validation = validate_trade(
            request.quantity,
            request.price,
            self.balance,
            preset.max_position_size,
        );
        if let Err(reason) = validation.into_result() {
            tracing::debug!("Rejected {} {}: {}", request.side, request.asset, reason);
            return Err(reason.into());
        }

        let session = self
            .session
            .as_mut()
            .ok_or_else(|| Error::InvalidOperation("No active trading session".to_string()))?;

        let entry_reason = request
            .entry_reason
            .unwrap_or_else(|| format!("{} order at {}", request.side, format_currency(request.price)));
        let trade = Trade::new(
            &session.session_id,
            &request.asset,
            request.side,
            request.quantity,
            request.price,
            entry_reason,
        );

        match trade.side {
            TradeSide::Buy => self.balance -= trade.cost(),
            TradeSide::Sell => self.balance += trade.cost(),
        }

        tracing::info!(
            "Opened {} {} {} @ {}",
            trade.side,
            trade.quantity,
            trade.asset,
            format_currency(trade.price)
        );
        session.trades_executed.push(trade.clone());
        Ok(trade)
    }

    /// Close an open trade at `exit_price`.
    ///
    /// Realizes P&L on the trade and unwinds its cash flow at the exit price:
    /// closing a buy credits `quantity * exit_price`, closing a sell debits it.
    pub fn close_trade(
        &mut self,
        trade_id: &str,
        exit_price: f64,
        exit_reason: impl Into<String>,
    ) -> Result<Trade> {
        if !matches!(self.phase, SessionPhase::Active | SessionPhase::Paused) {
            return Err(Error::InvalidOperation("No trading session in progress".to_string()));
        }

        if !exit_price.is_finite() {
            return Err(TradeRejection::InvalidParameters.into());
        }
        if exit_price <= 0.0 {
            return Err(TradeRejection::NonPositivePrice.into());
        }

        let trade = self
            .session
            .as_mut()
            .and_then(|s| s.trades_executed.iter_mut().find(|t| t.trade_id == trade_id))
            .ok_or_else(|| Error::TradeNotFound(trade_id.to_string()))?;

        if trade.status == TradeStatus::Closed {
            return Err(Error::InvalidOperation(format!(
                "Trade {} is already closed",
                trade_id
            )));
        }

        trade.profit_loss = calculate_pnl(trade.price, exit_price, trade.quantity, trade.side);
        trade.status = TradeStatus::Closed;
        trade.exit_reason = Some(exit_reason.into());

        let proceeds = trade.quantity * exit_price;
        match trade.side {
            TradeSide::Buy => self.balance += proceeds,
            TradeSide::Sell => self.balance -= proceeds,
        }

        tracing::info!(
            "Closed {} {} @ {} (P&L {})",
            trade.side,
            trade.asset,
            format_currency(exit_price),
            format_currency(trade.profit_loss)
        );
        Ok(trade.clone())
    }

    /// Current status summary.
    pub fn summary(&self) -> SessionSummary {
        let trades = self.trades();
        let realized_pnl = trades
            .iter()
            .filter(|t| t.status == TradeStatus::Closed)
            .map(|t| t.profit_loss)
            .sum();

        SessionSummary {
            phase: self.phase,
            session_id: self.session.as_ref().map(|s| s.session_id.clone()),
            session_type: self.session.as_ref().map(|s| s.session_type),
            starting_balance: self.session.as_ref().map(|s| s.virtual_currency_start),
            balance: self.balance,
            open_trades: self.session.as_ref().map_or(0, |s| s.open_trades().count()),
            trade_count: trades.len(),
            realized_pnl,
            started_at: self.session.as_ref().map(|s| s.start_time),
        }
    }
}

/// Session status summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub phase: SessionPhase,
    pub session_id: Option<String>,
    pub session_type: Option<SessionType>,
    pub starting_balance: Option<f64>,
    pub balance: f64,
    pub open_trades: usize,
    pub trade_count: usize,
    pub realized_pnl: f64,
    pub started_at: Option<DateTime<Utc>>,
}
