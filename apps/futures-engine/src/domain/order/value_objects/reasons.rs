//! Reasons for order cancellation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why an order was cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "code", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CancelReason {
    /// Session close reached before the entry filled.
    EndOfDay,
    /// A full candle traded beyond the target before entry.
    FullCandleOutside,
    /// A wick reached the target after the grace period.
    StaleWickOutside,
    /// Entry never filled within the timeout.
    UnfilledTimeout,
    /// The broker reports the entry order cancelled.
    RemoteCancelled,
    /// Remote bracket state could not be reconciled.
    RemoteAnomaly(String),
    /// Risk budget too small for a single contract.
    ZeroContracts,
}

impl CancelReason {
    /// Stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EndOfDay => "END_OF_DAY",
            Self::FullCandleOutside => "FULL_CANDLE_OUTSIDE",
            Self::StaleWickOutside => "STALE_WICK_OUTSIDE",
            Self::UnfilledTimeout => "UNFILLED_TIMEOUT",
            Self::RemoteCancelled => "REMOTE_CANCELLED",
            Self::RemoteAnomaly(_) => "REMOTE_ANOMALY",
            Self::ZeroContracts => "ZERO_CONTRACTS",
        }
    }
}

impl fmt::Display for CancelReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfDay => write!(f, "Session close reached before entry"),
            Self::FullCandleOutside => write!(f, "Full candle traded beyond target"),
            Self::StaleWickOutside => write!(f, "Wick reached target after grace period"),
            Self::UnfilledTimeout => write!(f, "Entry not filled before timeout"),
            Self::RemoteCancelled => write!(f, "Cancelled at broker"),
            Self::RemoteAnomaly(detail) => write!(f, "Remote bracket anomaly: {detail}"),
            Self::ZeroContracts => write!(f, "Risk budget below one contract"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_reason_codes() {
        assert_eq!(CancelReason::EndOfDay.code(), "END_OF_DAY");
        assert_eq!(
            CancelReason::RemoteAnomaly("x".to_string()).code(),
            "REMOTE_ANOMALY"
        );
    }

    #[test]
    fn anomaly_display_includes_detail() {
        let reason = CancelReason::RemoteAnomaly("no child filled".to_string());
        assert!(reason.to_string().contains("no child filled"));
    }

    #[test]
    fn cancel_reason_serde() {
        let json = serde_json::to_string(&CancelReason::UnfilledTimeout).unwrap();
        assert_eq!(json, r#"{"code":"UNFILLED_TIMEOUT"}"#);

        let parsed: CancelReason =
            serde_json::from_str(r#"{"code":"REMOTE_ANOMALY","detail":"missing"}"#).unwrap();
        assert_eq!(parsed, CancelReason::RemoteAnomaly("missing".to_string()));
    }
}
