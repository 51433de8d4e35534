//! Order status in the lifecycle.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a planned trade.
///
/// ```text
/// Planned ──► Placed ──► Filled ──► Profit | Loss
///    │           │          │
///    │           ▼          ▼
///    └──────► Cancelled ◄───┘ (remote anomaly only)
///
/// PlaceNow ──► Filled (market entry)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Planned by signal logic, not yet working at a broker.
    Planned,
    /// Planned for immediate market entry.
    PlaceNow,
    /// Working limit entry at the broker.
    Placed,
    /// Entry filled, position open.
    Filled,
    /// Closed at or beyond the target.
    Profit,
    /// Closed at or beyond the stop.
    Loss,
    /// Withdrawn before completion.
    Cancelled,
}

impl OrderStatus {
    /// Returns true if no further transition is possible.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Profit | Self::Loss | Self::Cancelled)
    }

    /// Returns true while the order is working or open.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self, Self::Placed | Self::PlaceNow | Self::Filled)
    }

    /// Returns true once the trade has been closed with a result.
    #[must_use]
    pub const fn is_profit_or_loss(&self) -> bool {
        matches!(self, Self::Profit | Self::Loss)
    }

    /// Returns true for orders that have not been filled yet.
    #[must_use]
    pub const fn is_pending_entry(&self) -> bool {
        matches!(self, Self::Planned | Self::Placed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Planned => write!(f, "PLANNED"),
            Self::PlaceNow => write!(f, "PLACE_NOW"),
            Self::Placed => write!(f, "PLACED"),
            Self::Filled => write!(f, "FILLED"),
            Self::Profit => write!(f, "PROFIT"),
            Self::Loss => write!(f, "LOSS"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}
