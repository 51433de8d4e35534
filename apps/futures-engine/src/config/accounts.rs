//! Live account configuration.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::infrastructure::broker::LiveAccount;

/// One live brokerage account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Account name. Orders tagged with another name are not sent here.
    pub name: String,
    /// Numeric account id.
    pub account_id: i64,
    /// Per-account risk budget; falls back to `risk.risk_per_trade`.
    #[serde(default)]
    pub risk_per_trade: Option<Decimal>,
}

impl AccountConfig {
    /// Build the adapter account, using `default_risk` when unset.
    #[must_use]
    pub fn to_live_account(&self, default_risk: Decimal) -> LiveAccount {
        LiveAccount {
            name: self.name.clone(),
            account_id: self.account_id,
            risk_per_trade: self.risk_per_trade.unwrap_or(default_risk),
        }
    }
}
