//! Risk-budget position sizing.
//!
//! Positions are sized in micro contracts first. Once the micro count
//! reaches the cutoff it is converted to standard contracts at 10:1, which
//! trades fewer, larger contracts for lower commission.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::errors::SizingError;
use super::instrument::{ContractTier, InstrumentTable};
use crate::domain::order::Order;

/// Micro contracts per standard contract.
pub const MICRO_PER_STANDARD: u32 = 10;

/// Default micro count at which sizing switches to standard contracts.
pub const DEFAULT_MICRO_CUTOFF: u32 = 10;

/// Account risk settings used for sizing and reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskProfile {
    /// Dollar risk budget per trade.
    pub risk_per_trade: Decimal,
    /// Micro count at which sizing switches tier.
    pub micro_cutoff: u32,
    /// Instrument specs.
    pub instruments: InstrumentTable,
}

impl Default for RiskProfile {
    fn default() -> Self {
        Self {
            risk_per_trade: dec!(550),
            micro_cutoff: DEFAULT_MICRO_CUTOFF,
            instruments: InstrumentTable::default(),
        }
    }
}

impl RiskProfile {
    /// Create a profile with the default cutoff and instrument table.
    #[must_use]
    pub fn new(risk_per_trade: Decimal) -> Self {
        Self {
            risk_per_trade,
            ..Self::default()
        }
    }

    /// Replace the risk budget, keeping cutoff and instruments.
    #[must_use]
    pub const fn with_risk_per_trade(mut self, risk_per_trade: Decimal) -> Self {
        self.risk_per_trade = risk_per_trade;
        self
    }

    /// Risk budget for one order after its risk multiplier.
    #[must_use]
    pub fn budget_for(&self, order: &Order) -> Decimal {
        self.risk_per_trade * order.risk_multiplier().unwrap_or(Decimal::ONE)
    }

    /// Size a position for `order`.
    ///
    /// # Errors
    ///
    /// Returns error if the contract is not in the instrument table.
    pub fn size(&self, order: &Order) -> Result<PositionSize, SizingError> {
        let spec = self
            .instruments
            .lookup(order.contract())
            .ok_or_else(|| SizingError::UnknownInstrument {
                contract: order.contract().to_string(),
            })?;

        let at_risk_per_micro = order.at_risk_per_contract(spec.micro_point_value);
        let (tier, contracts) =
            size_position(self.budget_for(order), at_risk_per_micro, self.micro_cutoff)?;

        Ok(PositionSize {
            tier,
            contracts,
            symbol: spec.symbol_for(order.contract(), tier),
            point_value: spec.point_value(tier),
            fee_per_contract: spec.fee(tier),
        })
    }
}

/// A sized position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionSize {
    /// Contract denomination.
    pub tier: ContractTier,
    /// Number of contracts. Zero means the budget is too small.
    pub contracts: u32,
    /// Symbol to trade.
    pub symbol: String,
    /// Dollars per point per contract at this tier.
    pub point_value: Decimal,
    /// Round-trip fee per contract at this tier.
    pub fee_per_contract: Decimal,
}

impl PositionSize {
    /// Whether the position has no contracts.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.contracts == 0
    }

    /// Total round-trip fees.
    #[must_use]
    pub fn fees(&self) -> Decimal {
        self.fee_per_contract * Decimal::from(self.contracts)
    }

    /// Dollars moved by `points` across the whole position.
    #[must_use]
    pub fn dollars(&self, points: Decimal) -> Decimal {
        points * self.point_value * Decimal::from(self.contracts)
    }
}

/// Convert a risk budget into a contract count and tier.
///
/// `micro = floor(risk / at_risk_per_micro)`; at or above `cutoff` the
/// position becomes `round(micro / 10)` standard contracts.
///
/// # Errors
///
/// Returns error if `at_risk_per_micro` is not positive.
pub fn size_position(
    risk: Decimal,
    at_risk_per_micro: Decimal,
    cutoff: u32,
) -> Result<(ContractTier, u32), SizingError> {
    if at_risk_per_micro <= Decimal::ZERO {
        return Err(SizingError::NonPositiveRisk {
            at_risk_per_contract: at_risk_per_micro,
        });
    }

    let micro = (risk / at_risk_per_micro)
        .floor()
        .max(Decimal::ZERO)
        .to_u32()
        .unwrap_or(u32::MAX);

    if micro >= cutoff {
        let standard = (Decimal::from(micro) / Decimal::from(MICRO_PER_STANDARD))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_u32()
            .unwrap_or(u32::MAX);
        Ok((ContractTier::Standard, standard))
    } else {
        Ok((ContractTier::Micro, micro))
    }
}
