//! Strategy tags attached to planned trades.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Strategy that produced the trade.
///
/// Ad-hoc strategies carry a free-text description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryType {
    /// Bounce off a detected supply/demand zone.
    ZoneBounce,
    /// Break of a prior swing high/low.
    SwingBreakout,
    /// Pullback into a Fibonacci retracement of the last swing.
    FibRetracement,
    /// Break of the opening range.
    OpeningRange,
    /// Free-text strategy tag.
    Custom(String),
}

impl EntryType {
    /// Strategies whose entries stay valid after price trades fully
    /// beyond the target before the entry fills.
    #[must_use]
    pub const fn tolerates_full_candle_outside(&self) -> bool {
        matches!(self, Self::SwingBreakout)
    }

    /// Grouping key used in performance reports.
    #[must_use]
    pub fn tag(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZoneBounce => write!(f, "ZONE_BOUNCE"),
            Self::SwingBreakout => write!(f, "SWING_BREAKOUT"),
            Self::FibRetracement => write!(f, "FIB_RETRACEMENT"),
            Self::OpeningRange => write!(f, "OPENING_RANGE"),
            Self::Custom(description) => write!(f, "{description}"),
        }
    }
}
