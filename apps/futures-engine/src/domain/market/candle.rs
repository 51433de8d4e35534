//! Price bars supplied by the market-data collaborator.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::time::snap_to_minute;

/// One minute, the boundary below which candle times are snapped.
pub const ONE_MINUTE: Duration = Duration::from_secs(60);

/// A candle (OHLCV bar).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candle {
    /// Open price.
    pub open: Decimal,
    /// High price.
    pub high: Decimal,
    /// Low price.
    pub low: Decimal,
    /// Close price.
    pub close: Decimal,
    /// Traded volume, when the feed supplies it.
    pub volume: Option<u64>,
    /// Bar start time.
    pub timestamp: DateTime<Utc>,
    /// Bar length.
    pub duration: Duration,
    /// When the bar was received. Observability only.
    pub observed_at: DateTime<Utc>,
}

impl Candle {
    /// Build a one-minute candle observed at its own timestamp.
    #[must_use]
    pub const fn new(
        timestamp: DateTime<Utc>,
        open: Decimal,
        high: Decimal,
        low: Decimal,
        close: Decimal,
    ) -> Self {
        Self {
            open,
            high,
            low,
            close,
            volume: None,
            timestamp,
            duration: ONE_MINUTE,
            observed_at: timestamp,
        }
    }

    /// Set the bar length.
    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the traded volume.
    #[must_use]
    pub const fn with_volume(mut self, volume: u64) -> Self {
        self.volume = Some(volume);
        self
    }

    /// Set the receive time.
    #[must_use]
    pub const fn with_observed_at(mut self, observed_at: DateTime<Utc>) -> Self {
        self.observed_at = observed_at;
        self
    }

    /// Close above open. A doji is not bullish.
    #[must_use]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Bar shorter than one minute (e.g. one-second bars).
    #[must_use]
    pub fn is_sub_minute(&self) -> bool {
        self.duration < ONE_MINUTE
    }

    /// Timestamp recorded for broker actions on this bar. Sub-minute bars
    /// are snapped up to the next whole minute.
    #[must_use]
    pub fn event_time(&self) -> DateTime<Utc> {
        if self.is_sub_minute() {
            snap_to_minute(self.timestamp)
        } else {
            self.timestamp
        }
    }
}
