//! Periodic driver for the market simulator.

use super::simulator::MarketSimulator;
use crate::{Error, Result};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Simulator shared between the desk and the ticker task.
pub type SharedMarket = Arc<Mutex<MarketSimulator>>;

pub(crate) fn lock_market(market: &SharedMarket) -> MutexGuard<'_, MarketSimulator> {
    market.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ticks a [`MarketSimulator`] on a fixed interval until stopped.
///
/// Every tick checks the ticker epoch while holding the market lock, and
/// [`stop`](Self::stop) bumps the epoch under that same lock. Once `stop`
/// returns no tick from the stopped run can touch the quotes.
#[derive(Debug)]
pub struct SimulationTicker {
    market: SharedMarket,
    interval: Duration,
    epoch: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl SimulationTicker {
    /// Create a stopped ticker.
    pub fn new(market: SharedMarket, interval: Duration) -> Self {
        Self {
            market,
            interval,
            epoch: Arc::new(AtomicU64::new(0)),
            handle: None,
        }
    }

    /// Tick cadence.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether a tick task is currently scheduled.
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Spawn the tick task on the current tokio runtime.
    ///
    /// The first tick fires one interval after start. Starting a running
    /// ticker is a no-op.
    pub fn start(&mut self) -> Result<()> {
        if self.handle.is_some() {
            return Ok(());
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|_| {
            Error::InvalidOperation("Simulation ticker requires a tokio runtime".to_string())
        })?;

        let run = self.epoch.load(Ordering::SeqCst);
        let epoch = Arc::clone(&self.epoch);
        let market = Arc::clone(&self.market);
        let period = self.interval;

        self.handle = Some(runtime.spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                let mut sim = lock_market(&market);
                if epoch.load(Ordering::SeqCst) != run {
                    break;
                }
                sim.tick(Utc::now());
                tracing::trace!("Market tick {}", sim.tick_count());
            }
        }));

        tracing::debug!("Simulation ticker started ({:?})", period);
        Ok(())
    }

    /// Stop ticking. Safe to call any number of times.
    pub fn stop(&mut self) {
        {
            let _guard = lock_market(&self.market);
            self.epoch.fetch_add(1, Ordering::SeqCst);
        }

        if let Some(handle) = self.handle.take() {
            handle.abort();
            tracing::debug!("Simulation ticker stopped");
        }
    }
}

impl Drop for SimulationTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulatorConfig;

    fn shared_market() -> SharedMarket {
        let config = SimulatorConfig {
            seed: Some(17),
            ..Default::default()
        };
        Arc::new(Mutex::new(MarketSimulator::from_config(&config)))
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_interval() {
        let market = shared_market();
        let mut ticker = SimulationTicker::new(Arc::clone(&market), Duration::from_secs(2));

        ticker.start().unwrap();
        assert!(ticker.is_running());

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(lock_market(&market).tick_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_mutation() {
        let market = shared_market();
        let mut ticker = SimulationTicker::new(Arc::clone(&market), Duration::from_secs(2));

        ticker.start().unwrap();
        time::sleep(Duration::from_secs(3)).await;
        ticker.stop();

        let ticks = lock_market(&market).tick_count();
        let quotes = lock_market(&market).quotes().clone();

        time::sleep(Duration::from_secs(20)).await;

        assert!(!ticker.is_running());
        assert_eq!(lock_market(&market).tick_count(), ticks);
        assert_eq!(lock_market(&market).quotes(), &quotes);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent_and_restartable() {
        let market = shared_market();
        let mut ticker = SimulationTicker::new(Arc::clone(&market), Duration::from_secs(2));

        ticker.stop();
        ticker.start().unwrap();
        ticker.start().unwrap();
        ticker.stop();
        ticker.stop();

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(lock_market(&market).tick_count(), 0);

        ticker.start().unwrap();
        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(lock_market(&market).tick_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_ticking() {
        let market = shared_market();
        {
            let mut ticker = SimulationTicker::new(Arc::clone(&market), Duration::from_secs(2));
            ticker.start().unwrap();
        }

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(lock_market(&market).tick_count(), 0);
    }

    #[test]
    fn test_start_without_runtime() {
        let mut ticker = SimulationTicker::new(shared_market(), Duration::from_secs(2));
        assert!(matches!(ticker.start(), Err(Error::InvalidOperation(_))));
        assert!(!ticker.is_running());
    }
}
