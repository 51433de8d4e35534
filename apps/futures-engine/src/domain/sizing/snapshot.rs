//! Fee-aware reporting snapshot of an order.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::errors::SizingError;
use super::instrument::ContractTier;
use super::position::RiskProfile;
use crate::domain::order::Order;

/// An order plus the position it would carry under a risk profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerializableOrder {
    /// The order.
    #[serde(flatten)]
    pub order: Order,
    /// Contract denomination.
    pub tier: ContractTier,
    /// Number of contracts.
    pub contracts: u32,
    /// Traded symbol.
    pub symbol: String,
    /// Dollars lost at the stop before fees.
    pub gross_at_risk: Decimal,
    /// Dollars lost at the stop including fees.
    pub dollars_at_risk: Decimal,
    /// Dollars gained at the target net of fees.
    pub dollars_potential: Decimal,
    /// Round-trip fees for the position.
    pub fees: Decimal,
}

impl SerializableOrder {
    /// Size `order` under `profile` and price its risk and potential.
    ///
    /// # Errors
    ///
    /// Returns error if the order cannot be sized.
    pub fn from_order(order: Order, profile: &RiskProfile) -> Result<Self, SizingError> {
        let size = profile.size(&order)?;
        let gross_at_risk = size.dollars(order.at_risk_points());
        let target_points = (order.take_profit() - order.entry_point()).abs();
        let fees = size.fees();
        let dollars_potential = size.dollars(target_points) - fees;

        Ok(Self {
            tier: size.tier,
            contracts: size.contracts,
            symbol: size.symbol,
            gross_at_risk,
            dollars_at_risk: gross_at_risk + fees,
            dollars_potential,
            fees,
            order,
        })
    }

    /// Realized dollars net of fees. `None` unless closed at Profit or Loss.
    #[must_use]
    pub fn pnl(&self) -> Option<Decimal> {
        self.order
            .realized_r()
            .map(|r| r * self.gross_at_risk - self.fees)
    }
}
