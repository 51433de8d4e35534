//! Risk budget configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::domain::sizing::{DEFAULT_MICRO_CUTOFF, InstrumentTable, RiskProfile};

/// Risk settings shared by reporting and accounts without their own budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Dollar risk per trade.
    #[serde(default = "default_risk_per_trade")]
    pub risk_per_trade: Decimal,
    /// Micro count at which sizing switches to standard contracts.
    #[serde(default = "default_micro_cutoff")]
    pub micro_cutoff: u32,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            risk_per_trade: default_risk_per_trade(),
            micro_cutoff: default_micro_cutoff(),
        }
    }
}

impl RiskConfig {
    /// Sizing profile over `instruments`.
    #[must_use]
    pub fn to_profile(&self, instruments: InstrumentTable) -> RiskProfile {
        RiskProfile {
            risk_per_trade: self.risk_per_trade,
            micro_cutoff: self.micro_cutoff,
            instruments,
        }
    }
}

const fn default_risk_per_trade() -> Decimal {
    dec!(550)
}

const fn default_micro_cutoff() -> u32 {
    DEFAULT_MICRO_CUTOFF
}
