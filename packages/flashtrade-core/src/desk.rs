//! Trading desk: the controller the UI layer talks to.
//!
//! The desk owns the session holder and the shared market simulator, and
//! keeps the simulation ticker running exactly while a session is active.

use crate::config::FlashConfig;
use crate::market::{lock_market, MarketSimulator, SharedMarket, SimulationTicker};
use crate::trading::{
    unrealized_pnl, validate_trade_input, HistorySummary, SessionPhase, SessionState,
    SessionSummary, TradeRejection, TradeRequest,
};
use crate::types::{AssetQuote, SessionType, Trade, TradeSession, TradeSide};
use crate::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// Single owner of session state and market state.
#[derive(Debug)]
pub struct TradingDesk {
    session: SessionState,
    market: SharedMarket,
    ticker: SimulationTicker,
}

impl Default for TradingDesk {
    fn default() -> Self {
        Self::new(&FlashConfig::default())
    }
}

impl TradingDesk {
    /// Create an idle desk seeded with the mock market data.
    pub fn new(config: &FlashConfig) -> Self {
        let market = Arc::new(Mutex::new(MarketSimulator::from_config(&config.simulator)));
        let ticker = SimulationTicker::new(Arc::clone(&market), config.simulator.tick_interval());

        Self {
            session: SessionState::with_config(config),
            market,
            ticker,
        }
    }

    /// Session holder, read-only.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Handle to the shared simulator.
    pub fn market(&self) -> SharedMarket {
        Arc::clone(&self.market)
    }

    /// Whether the ticker task is scheduled.
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_running()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    /// Current virtual balance.
    pub fn balance(&self) -> f64 {
        self.session.balance()
    }

    /// Trades of the current session.
    pub fn trades(&self) -> &[Trade] {
        self.session.trades()
    }

    /// Snapshot of all quotes.
    pub fn quotes(&self) -> BTreeMap<String, AssetQuote> {
        lock_market(&self.market).quotes().clone()
    }

    /// Snapshot of one quote.
    pub fn quote(&self, symbol: &str) -> Result<AssetQuote> {
        lock_market(&self.market)
            .quote(symbol)
            .cloned()
            .ok_or_else(|| Error::UnknownSymbol(symbol.to_uppercase()))
    }

    /// Start a session and begin ticking prices.
    ///
    /// Must be called within a tokio runtime.
    pub fn start(&mut self, session_type: SessionType) -> Result<&TradeSession> {
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(Error::InvalidOperation(
                "Simulation ticker requires a tokio runtime".to_string(),
            ));
        }
        self.session.start(session_type)?;
        self.ticker.start()?;
        self.session
            .session()
            .ok_or_else(|| Error::InvalidOperation("Session failed to start".to_string()))
    }

    /// Pause the session and stop ticking.
    pub fn pause(&mut self) -> Result<()> {
        self.session.pause()?;
        self.ticker.stop();
        Ok(())
    }

    /// Resume a paused session and restart ticking.
    pub fn resume(&mut self) -> Result<()> {
        self.session.resume()?;
        if let Err(e) = self.ticker.start() {
            tracing::warn!("Failed to restart ticker: {}", e);
            self.session.pause()?;
            return Err(e);
        }
        Ok(())
    }

    /// Stop ticking and discard the session.
    pub fn reset(&mut self) {
        self.ticker.stop();
        self.session.reset();
    }

    /// Complete the session and stop ticking.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<&TradeSession> {
        self.ticker.stop();
        self.session.complete(now)
    }

    /// Complete the session if its preset duration has run out.
    pub fn complete_if_expired(&mut self, now: DateTime<Utc>) -> Result<bool> {
        let in_progress = matches!(self.phase(), SessionPhase::Active | SessionPhase::Paused);
        if !in_progress || !self.session.is_expired(now) {
            return Ok(false);
        }
        tracing::info!("Session time is up");
        self.complete(now)?;
        Ok(true)
    }

    /// Time left in the current session.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.session.time_remaining(now)
    }

    /// Apply one simulator tick immediately. Only valid while active.
    pub fn advance_market(&mut self, now: DateTime<Utc>) -> Result<()> {
        if !self.session.is_active() {
            return Err(Error::InvalidOperation(
                "Prices only move during an active session".to_string(),
            ));
        }
        lock_market(&self.market).tick(now);
        Ok(())
    }

    /// Place an order at the current market price of `symbol`.
    pub fn submit_market_order(
        &mut self,
        symbol: &str,
        side: TradeSide,
        quantity: f64,
    ) -> Result<Trade> {
        let price = lock_market(&self.market).price(symbol)?;
        self.session
            .submit_trade(TradeRequest::new(symbol, side, quantity, price))
    }

    /// Place an order with an explicit price.
    pub fn submit_trade(&mut self, request: TradeRequest) -> Result<Trade> {
        lock_market(&self.market).price(&request.asset)?;
        self.session.submit_trade(request)
    }

    /// Place an order from raw form text.
    ///
    /// Requires an active session. Unparseable input is then rejected with
    /// "invalid trade parameters".
    pub fn submit_form(
        &mut self,
        symbol: &str,
        side: TradeSide,
        quantity: &str,
        price: &str,
    ) -> Result<Trade> {
        let max_position = self
            .session
            .preset()
            .filter(|_| self.session.is_active())
            .map(|p| p.max_position_size)
            .ok_or_else(|| Error::InvalidOperation("No active trading session".to_string()))?;

        let (validation, values) =
            validate_trade_input(quantity, price, self.session.balance(), max_position);
        validation.into_result()?;
        let (quantity, price) = values.ok_or(TradeRejection::InvalidParameters)?;

        self.submit_trade(TradeRequest::new(symbol, side, quantity, price))
    }

    /// Close an open trade at the current market price of its asset.
    pub fn close_trade(&mut self, trade_id: &str, exit_reason: &str) -> Result<Trade> {
        let asset = self
            .session
            .trades()
            .iter()
            .find(|t| t.trade_id == trade_id)
            .map(|t| t.asset.clone())
            .ok_or_else(|| Error::TradeNotFound(trade_id.to_string()))?;
        let price = lock_market(&self.market).price(&asset)?;
        self.session.close_trade(trade_id, price, exit_reason)
    }

    /// Mark-to-market P&L of all open trades.
    pub fn unrealized_pnl(&self) -> f64 {
        let Some(session) = self.session.session() else {
            return 0.0;
        };
        let market = lock_market(&self.market);
        session
            .open_trades()
            .filter_map(|t| market.price(&t.asset).ok().map(|p| unrealized_pnl(t, p)))
            .sum()
    }

    /// Session status summary.
    pub fn summary(&self) -> SessionSummary {
        self.session.summary()
    }

    /// Statistics over the current session's trades.
    pub fn history(&self) -> HistorySummary {
        HistorySummary::from_trades(self.session.trades())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatorConfig;
    use approx::assert_relative_eq;
    use tokio::time;

    fn desk() -> TradingDesk {
        let config = FlashConfig {
            simulator: SimulatorConfig {
                seed: Some(21),
                ..Default::default()
            },
            ..Default::default()
        };
        TradingDesk::new(&config)
    }

    #[tokio::test(start_paused = true)]
    async fn test_prices_tick_only_while_active() {
        let mut desk = desk();
        let initial = desk.quotes();

        time::sleep(std::time::Duration::from_secs(10)).await;
        assert_eq!(desk.quotes(), initial);

        desk.start(SessionType::Practice).unwrap();
        assert!(desk.is_ticking());
        time::sleep(std::time::Duration::from_secs(5)).await;
        assert_ne!(desk.quotes()["BTC"].price, initial["BTC"].price);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_then_reset_stops_ticks() {
        let mut desk = desk();
        desk.start(SessionType::Practice).unwrap();
        time::sleep(std::time::Duration::from_secs(3)).await;

        desk.pause().unwrap();
        desk.reset();
        let frozen = desk.quotes();

        time::sleep(std::time::Duration::from_secs(30)).await;

        assert!(!desk.is_ticking());
        assert_eq!(desk.quotes(), frozen);
        assert_eq!(desk.phase(), SessionPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_restarts_ticks() {
        let mut desk = desk();
        desk.start(SessionType::Practice).unwrap();
        desk.pause().unwrap();
        let paused = desk.quotes();

        time::sleep(std::time::Duration::from_secs(10)).await;
        assert_eq!(desk.quotes(), paused);

        desk.resume().unwrap();
        time::sleep(std::time::Duration::from_secs(3)).await;
        assert_ne!(desk.quotes(), paused);
    }

    #[tokio::test(start_paused = true)]
    async fn test_market_order_uses_quote() {
        let mut desk = desk();
        desk.start(SessionType::Practice).unwrap();

        let trade = desk
            .submit_market_order("BTC", TradeSide::Buy, 0.01)
            .unwrap();

        assert_eq!(trade.price, 45000.0);
        assert_relative_eq!(desk.balance(), 9550.0);
        assert!(matches!(
            desk.submit_market_order("DOGE", TradeSide::Buy, 1.0),
            Err(Error::UnknownSymbol(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_form_submission() {
        let mut desk = desk();
        assert!(matches!(
            desk.submit_form("BTC", TradeSide::Buy, "0.01", "45000"),
            Err(Error::InvalidOperation(_))
        ));

        desk.start(SessionType::Practice).unwrap();

        let result = desk.submit_form("BTC", TradeSide::Buy, "lots", "45000");
        match result {
            Err(Error::Rejected(reason)) => assert_eq!(reason.to_string(), "invalid trade parameters"),
            other => panic!("expected rejection, got {:?}", other),
        }

        let result = desk.submit_form("BTC", TradeSide::Buy, "0.1", "45000");
        assert!(matches!(
            result,
            Err(Error::Rejected(TradeRejection::PositionLimit { .. }))
        ));

        desk.submit_form("BTC", TradeSide::Buy, "0.01", "45000").unwrap();
        assert_relative_eq!(desk.balance(), 9550.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_form_on_paused_session_reports_no_session() {
        let mut desk = desk();
        desk.start(SessionType::Practice).unwrap();
        desk.pause().unwrap();

        for (quantity, price) in [("abc", "45000"), ("0.01", "45000")] {
            match desk.submit_form("BTC", TradeSide::Buy, quantity, price) {
                Err(Error::InvalidOperation(msg)) => assert_eq!(msg, "No active trading session"),
                other => panic!("expected no-session error, got {:?}", other),
            }
        }
        assert!(desk.trades().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_at_market() {
        let mut desk = desk();
        desk.start(SessionType::Practice).unwrap();
        let trade = desk.submit_market_order("ETH", TradeSide::Buy, 0.1).unwrap();

        desk.advance_market(Utc::now()).unwrap();
        let exit = desk.quote("ETH").unwrap().price;
        let expected = (exit - 3200.0) * 0.1;
        assert_relative_eq!(desk.unrealized_pnl(), expected, epsilon = 1e-9);

        let closed = desk.close_trade(&trade.trade_id, "manual exit").unwrap();
        assert_relative_eq!(closed.profit_loss, expected, epsilon = 1e-9);
        assert_eq!(desk.unrealized_pnl(), 0.0);
        assert_eq!(desk.history().total_trades, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_advance_requires_active() {
        let mut desk = desk();
        assert!(matches!(
            desk.advance_market(Utc::now()),
            Err(Error::InvalidOperation(_))
        ));

        desk.start(SessionType::Practice).unwrap();
        desk.pause().unwrap();
        assert!(matches!(
            desk.advance_market(Utc::now()),
            Err(Error::InvalidOperation(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_complete_if_expired() {
        let mut desk = desk();
        desk.start(SessionType::Tutorial).unwrap();
        let start = desk.session().session().unwrap().start_time;

        assert!(!desk.complete_if_expired(start + Duration::minutes(5)).unwrap());
        assert!(desk.complete_if_expired(start + Duration::minutes(11)).unwrap());
        assert_eq!(desk.phase(), SessionPhase::Completed);
        assert!(!desk.is_ticking());
        assert!(!desk.complete_if_expired(start + Duration::minutes(12)).unwrap());
    }

    #[test]
    fn test_start_requires_runtime() {
        let mut desk = desk();
        assert!(matches!(
            desk.start(SessionType::Practice),
            Err(Error::InvalidOperation(_))
        ));
        assert_eq!(desk.phase(), SessionPhase::Idle);
    }
}
