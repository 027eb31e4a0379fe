//! Pre-trade validation.

use serde::{Deserialize, Serialize};

/// Why a proposed trade was refused.
///
/// The `Display` text is shown to the user next to the order form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TradeRejection {
    #[error("quantity must be positive")]
    NonPositiveQuantity,

    #[error("price must be positive")]
    NonPositivePrice,

    #[error("insufficient balance")]
    InsufficientBalance,

    #[error("position size exceeds {limit_percent}% limit")]
    PositionLimit { limit_percent: f64 },

    #[error("invalid trade parameters")]
    InvalidParameters,
}

/// Outcome of [`validate_trade`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeValidation {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<TradeRejection>,
}

impl TradeValidation {
    fn accept() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    fn reject(reason: TradeRejection) -> Self {
        Self {
            valid: false,
            reason: Some(reason),
        }
    }

    /// Whether the trade may proceed.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Convert into a `Result`, surfacing the rejection as the error.
    pub fn into_result(self) -> Result<(), TradeRejection> {
        match self.reason {
            Some(reason) => Err(reason),
            None => Ok(()),
        }
    }
}

/// Check a proposed trade against the available balance and position limit.
///
/// Rules are applied in order and the first failure wins:
/// quantity, price, balance, then position size as a fraction of balance.
/// Non-finite inputs are rejected as invalid parameters before any rule runs.
pub fn validate_trade(
    quantity: f64,
    price: f64,
    available_balance: f64,
    max_position_fraction: f64,
) -> TradeValidation {
    if !quantity.is_finite() || !price.is_finite() {
        return TradeValidation::reject(TradeRejection::InvalidParameters);
    }

    if quantity <= 0.0 {
        return TradeValidation::reject(TradeRejection::NonPositiveQuantity);
    }

    if price <= 0.0 {
        return TradeValidation::reject(TradeRejection::NonPositivePrice);
    }

    let total_cost = quantity * price;
    if total_cost > available_balance {
        return TradeValidation::reject(TradeRejection::InsufficientBalance);
    }

    if total_cost > available_balance * max_position_fraction {
        return TradeValidation::reject(TradeRejection::PositionLimit {
            limit_percent: max_position_fraction * 100.0,
        });
    }

    TradeValidation::accept()
}

/// Validate raw form input. Text that does not parse as a number is an
/// invalid-parameters rejection rather than an error.
pub fn validate_trade_input(
    quantity: &str,
    price: &str,
    available_balance: f64,
    max_position_fraction: f64,
) -> (TradeValidation, Option<(f64, f64)>) {
    let parsed = quantity
        .trim()
        .parse::<f64>()
        .ok()
        .zip(price.trim().parse::<f64>().ok());

    match parsed {
        Some((q, p)) => {
            let validation = validate_trade(q, p, available_balance, max_position_fraction);
            let values = validation.is_valid().then_some((q, p));
            (validation, values)
        }
        None => (
            TradeValidation::reject(TradeRejection::InvalidParameters),
            None,
        ),
    }
}
