//! Profit and loss arithmetic.

use crate::types::{Trade, TradeSide};

/// Profit or loss of a position closed at `exit_price`.
///
/// Buys gain when the price rises, sells (shorts) gain when it falls. Inputs
/// are not validated here.
pub fn calculate_pnl(entry_price: f64, exit_price: f64, quantity: f64, side: TradeSide) -> f64 {
    match side {
        TradeSide::Buy => (exit_price - entry_price) * quantity,
        TradeSide::Sell => (entry_price - exit_price) * quantity,
    }
}

/// Mark-to-market P&L of an open trade.
pub fn unrealized_pnl(trade: &Trade, current_price: f64) -> f64 {
    calculate_pnl(trade.price, current_price, trade.quantity, trade.side)
}

/// Percentage change from `old_value` to `new_value`.
pub fn percentage_change(old_value: f64, new_value: f64) -> f64 {
    if old_value == 0.0 {
        return 0.0;
    }
    ((new_value - old_value) / old_value) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_long_pnl() {
        assert_relative_eq!(calculate_pnl(150.0, 175.0, 5.0, TradeSide::Buy), 125.0);
        assert_relative_eq!(calculate_pnl(150.0, 140.0, 5.0, TradeSide::Buy), -50.0);
    }

    #[test]
    fn test_short_pnl() {
        assert_relative_eq!(calculate_pnl(3200.0, 3100.0, 2.0, TradeSide::Sell), 200.0);
        assert_relative_eq!(calculate_pnl(3200.0, 3300.0, 2.0, TradeSide::Sell), -200.0);
    }

    #[test]
    fn test_pnl_antisymmetric() {
        let cases = [
            (45000.0, 45250.5, 0.01),
            (0.85, 0.8, 1000.0),
            (120.0, 120.0, 3.0),
            (15.5, 17.25, 12.5),
        ];

        for (entry, exit, quantity) in cases {
            let long = calculate_pnl(entry, exit, quantity, TradeSide::Buy);
            let short = calculate_pnl(entry, exit, quantity, TradeSide::Sell);
            assert_eq!(long, -short);
        }
    }

    #[test]
    fn test_unrealized_pnl() {
        let trade = Trade::new("s", "BTC", TradeSide::Buy, 0.01, 45000.0, "");
        assert_relative_eq!(unrealized_pnl(&trade, 46000.0), 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_percentage_change() {
        assert_relative_eq!(percentage_change(100.0, 110.0), 10.0);
        assert_relative_eq!(percentage_change(3200.0, 3115.0), -2.65625);
        assert_eq!(percentage_change(0.0, 5.0), 0.0);
    }
}
