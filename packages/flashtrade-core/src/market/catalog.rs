//! Tradable assets and the seed quotes used by the simulator.

use crate::types::AssetQuote;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// A tradable asset with its reference price.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct TradingAsset {
    pub symbol: &'static str,
    pub name: &'static str,
    pub price: f64,
}

/// Every tradable symbol.
pub const ALL_ASSETS: [&str; 5] = ["BTC", "ETH", "SOL", "MATIC", "LINK"];

/// Asset catalog.
pub const TRADING_ASSETS: [TradingAsset; 5] = [
    TradingAsset { symbol: "BTC", name: "Bitcoin", price: 45000.0 },
    TradingAsset { symbol: "ETH", name: "Ethereum", price: 3200.0 },
    TradingAsset { symbol: "SOL", name: "Solana", price: 120.0 },
    TradingAsset { symbol: "MATIC", name: "Polygon", price: 0.85 },
    TradingAsset { symbol: "LINK", name: "Chainlink", price: 15.50 },
];

/// Look up an asset by symbol (case-insensitive).
pub fn get_asset(symbol: &str) -> Option<&'static TradingAsset> {
    TRADING_ASSETS
        .iter()
        .find(|a| a.symbol.eq_ignore_ascii_case(symbol))
}

/// Seed quotes shown before any simulated tick.
pub fn mock_market_data(now: DateTime<Utc>) -> BTreeMap<String, AssetQuote> {
    let seed = [
        ("BTC", 45000.0, 1250.0, 2.85, 28_500_000_000.0, 46200.0, 43800.0),
        ("ETH", 3200.0, -85.0, -2.59, 15_200_000_000.0, 3350.0, 3150.0),
        ("SOL", 120.0, 8.5, 7.62, 2_100_000_000.0, 125.0, 110.0),
    ];

    seed.into_iter()
        .map(|(symbol, price, change, change_percent, volume, high, low)| {
            (
                symbol.to_string(),
                AssetQuote {
                    symbol: symbol.to_string(),
                    price,
                    change,
                    change_percent,
                    volume,
                    high_24h: high,
                    low_24h: low,
                    timestamp: now,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_asset() {
        let asset = get_asset("matic").unwrap();
        assert_eq!(asset.name, "Polygon");
        assert_eq!(asset.price, 0.85);
        assert!(get_asset("DOGE").is_none());
    }

    #[test]
    fn test_catalog_matches_symbols() {
        let symbols: Vec<_> = TRADING_ASSETS.iter().map(|a| a.symbol).collect();
        assert_eq!(symbols, ALL_ASSETS);
    }

    #[test]
    fn test_mock_market_data() {
        let data = mock_market_data(Utc::now());

        assert_eq!(data.len(), 3);
        assert_eq!(data["BTC"].price, 45000.0);
        assert_eq!(data["ETH"].change, -85.0);
        assert_eq!(data["SOL"].high_24h, 125.0);
    }
}
