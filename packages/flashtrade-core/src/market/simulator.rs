//! Random-walk quote simulator.

use super::catalog::mock_market_data;
use crate::config::SimulatorConfig;
use crate::types::{AssetQuote, ChartPoint};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Move `price` by a uniform random fraction in `[-volatility, +volatility]`.
///
/// `price` must be positive; the result then lies in
/// `[price * (1 - volatility), price * (1 + volatility)]`.
pub fn generate_price_movement<R: Rng + ?Sized>(price: f64, volatility: f64, rng: &mut R) -> f64 {
    let volatility = volatility.abs();
    let change = rng.gen_range(-volatility..=volatility);
    price * (1.0 + change)
}

/// A single simulated price observation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// Owns the live quote map and perturbs it on every tick.
#[derive(Debug)]
pub struct MarketSimulator {
    quotes: BTreeMap<String, AssetQuote>,
    volatility: f64,
    rng: ChaCha8Rng,
    history: BTreeMap<String, VecDeque<PricePoint>>,
    history_len: usize,
    ticks: u64,
}

impl MarketSimulator {
    /// Create a simulator over the given quotes.
    pub fn new(quotes: BTreeMap<String, AssetQuote>, config: &SimulatorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let history = quotes
            .iter()
            .map(|(symbol, quote)| {
                let mut points = VecDeque::new();
                points.push_back(PricePoint {
                    timestamp: quote.timestamp,
                    price: quote.price,
                });
                (symbol.clone(), points)
            })
            .collect();

        Self {
            quotes,
            volatility: config.volatility,
            rng,
            history,
            history_len: config.history_len.max(1),
            ticks: 0,
        }
    }

    /// Create a simulator seeded with the mock market data.
    pub fn from_config(config: &SimulatorConfig) -> Self {
        Self::new(mock_market_data(Utc::now()), config)
    }

    /// Per-tick volatility.
    pub fn volatility(&self) -> f64 {
        self.volatility
    }

    /// Number of ticks applied so far.
    pub fn tick_count(&self) -> u64 {
        self.ticks
    }

    /// All current quotes, keyed by symbol.
    pub fn quotes(&self) -> &BTreeMap<String, AssetQuote> {
        &self.quotes
    }

    /// Current quote for a symbol.
    pub fn quote(&self, symbol: &str) -> Option<&AssetQuote> {
        self.quotes.get(&symbol.to_uppercase())
    }

    /// Current price for a symbol.
    pub fn price(&self, symbol: &str) -> Result<f64> {
        self.quote(symbol)
            .map(|q| q.price)
            .ok_or_else(|| Error::UnknownSymbol(symbol.to_uppercase()))
    }

    /// Apply one random-walk step to every quote.
    ///
    /// `change` and `change_percent` are relative to the previous tick.
    /// `high_24h`, `low_24h` and `volume` are left as they were.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        for (symbol, quote) in self.quotes.iter_mut() {
            let old_price = quote.price;
            let new_price = generate_price_movement(old_price, self.volatility, &mut self.rng);
            let change = new_price - old_price;

            quote.price = new_price;
            quote.change = change;
            quote.change_percent = (change / old_price) * 100.0;
            quote.timestamp = now;

            let points = self.history.entry(symbol.clone()).or_default();
            points.push_back(PricePoint {
                timestamp: now,
                price: new_price,
            });
            while points.len() > self.history_len {
                points.pop_front();
            }
        }
        self.ticks += 1;
    }

    /// Recorded prices for a symbol, oldest first.
    pub fn history(&self, symbol: &str) -> Vec<PricePoint> {
        self.history
            .get(&symbol.to_uppercase())
            .map(|points| points.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Group recorded prices into OHLC candles of `ticks_per_candle` points.
    ///
    /// Volume is not simulated, so candles carry zero volume.
    pub fn candles(&self, symbol: &str, ticks_per_candle: usize) -> Vec<ChartPoint> {
        if ticks_per_candle == 0 {
            return Vec::new();
        }

        self.history(symbol)
            .chunks(ticks_per_candle)
            .filter_map(|chunk| {
                let first = chunk.first()?;
                let last = chunk.last()?;
                let (high, low) = chunk.iter().fold((f64::MIN, f64::MAX), |(h, l), p| {
                    (h.max(p.price), l.min(p.price))
                });
                Some(ChartPoint {
                    timestamp: first.timestamp,
                    open: first.price,
                    high,
                    low,
                    close: last.price,
                    volume: 0.0,
                })
            })
            .collect()
    }
}
