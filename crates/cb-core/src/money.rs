//! Money and percentage helpers
//!
//! Every monetary amount and percentage is a `rust_decimal::Decimal`. Stored
//! amounts carry a fixed number of decimal places; [`Precision`] rounds
//! intermediate results to that scale with banker's rounding.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places kept for stored amounts
pub const DEFAULT_MONEY_SCALE: u32 = 2;

/// Rounding policy applied to computed amounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Precision {
    pub scale: u32,
}

impl Default for Precision {
    fn default() -> Self {
        Self {
            scale: DEFAULT_MONEY_SCALE,
        }
    }
}

impl Precision {
    pub fn new(scale: u32) -> Self {
        Self { scale }
    }

    /// Round to the configured scale, midpoint to even
    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.scale, RoundingStrategy::MidpointNearestEven)
    }
}

/// `1 + percent / 100`
pub fn percent_multiplier(percent: Decimal) -> Decimal {
    Decimal::ONE + percent / Decimal::ONE_HUNDRED
}

/// Apply a percentage markup: `amount * (1 + percent / 100)`.
///
/// `None` when the result does not fit in a `Decimal`.
pub fn apply_percent(amount: Decimal, percent: Decimal) -> Option<Decimal> {
    amount.checked_mul(percent_multiplier(percent))
}
