//! Mock market data and the random-walk price simulator.
//!
//! Provides the asset catalog, the simulator that perturbs quotes, and a
//! cancellable ticker that drives it on a fixed cadence.

mod catalog;
mod simulator;
mod ticker;

pub use catalog::{get_asset, mock_market_data, TradingAsset, ALL_ASSETS, TRADING_ASSETS};
pub use simulator::{generate_price_movement, MarketSimulator, PricePoint};
pub use ticker::{SharedMarket, SimulationTicker};

pub(crate) use ticker::lock_market;
