//! Position sizing errors.

use std::fmt;

use rust_decimal::Decimal;

/// Errors that can occur while sizing a position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizingError {
    /// No instrument spec matches the contract symbol.
    UnknownInstrument {
        /// Contract symbol.
        contract: String,
    },

    /// Risk per contract must be positive.
    NonPositiveRisk {
        /// Dollars at risk per micro contract.
        at_risk_per_contract: Decimal,
    },
}

impl fmt::Display for SizingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownInstrument { contract } => {
                write!(f, "No instrument spec for contract: {contract}")
            }
            Self::NonPositiveRisk {
                at_risk_per_contract,
            } => {
                write!(
                    f,
                    "Risk per contract must be positive, got {at_risk_per_contract}"
                )
            }
        }
    }
}

impl std::error::Error for SizingError {}
