//! Size of a proposed rent increase, computed before any compliance review.

use serde::{Deserialize, Serialize};

use super::domain::ensure_positive;
use super::PricingError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RentIncrease {
    pub current_rent: f64,
    pub proposed_rent: f64,
    /// Proposed minus current; negative for a decrease.
    pub amount: f64,
    /// Amount as a percentage of the current rent, rounded to two decimals.
    pub percentage: f64,
}

impl RentIncrease {
    pub fn is_increase(&self) -> bool {
        self.amount > 0.0
    }
}

pub fn rent_increase(current_rent: f64, proposed_rent: f64) -> Result<RentIncrease, PricingError> {
    ensure_positive("current_rent", current_rent)?;
    ensure_positive("proposed_rent", proposed_rent)?;

    let amount = proposed_rent - current_rent;
    let percentage = (amount / current_rent * 100.0 * 100.0).round() / 100.0;

    Ok(RentIncrease {
        current_rent,
        proposed_rent,
        amount: (amount * 100.0).round() / 100.0,
        percentage,
    })
}
