//! Session clock and order-age limits used by the rule pipeline.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use chrono_tz::Tz;

/// Time limits applied by the cancellation and end-of-day rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleTiming {
    /// Age after which a wick through the target cancels a resting order.
    pub stale_grace: Duration,
    /// Age after which an unfilled order is cancelled unconditionally.
    pub unfilled_timeout: Duration,
    /// Exchange session close, local to `timezone`.
    pub session_close: NaiveTime,
    /// How long before the close positions are flattened.
    pub exit_lead: Duration,
    /// Exchange time zone.
    pub timezone: Tz,
}

impl Default for RuleTiming {
    fn default() -> Self {
        Self {
            stale_grace: Duration::minutes(5),
            unfilled_timeout: Duration::minutes(10),
            session_close: NaiveTime::from_hms_opt(16, 0, 0).unwrap_or(NaiveTime::MIN),
            exit_lead: Duration::minutes(5),
            timezone: chrono_tz::America::New_York,
        }
    }
}

impl RuleTiming {
    /// Local time at which the end-of-day rule starts firing.
    #[must_use]
    pub fn exit_cutoff(&self) -> NaiveTime {
        self.session_close - self.exit_lead
    }

    /// Whether `at` falls in `[exit_cutoff, session_close)` on the exchange
    /// clock. Candles after the close belong to the next session.
    #[must_use]
    pub fn is_end_of_day(&self, at: DateTime<Utc>) -> bool {
        let current = at.with_timezone(&self.timezone).time();
        let start = self.exit_cutoff();
        let end = self.session_close;
        if start <= end {
            start <= current && current < end
        } else {
            // window wraps past midnight
            current >= start || current < end
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn default_cutoff_is_1555_eastern() {
        let timing = RuleTiming::default();
        assert_eq!(
            timing.exit_cutoff(),
            NaiveTime::from_hms_opt(15, 55, 0).unwrap()
        );
    }

    #[test]
    fn end_of_day_uses_exchange_clock() {
        let timing = RuleTiming::default();
        // March 4 2024 is EST (UTC-5)
        let before = Utc.with_ymd_and_hms(2024, 3, 4, 20, 54, 0).unwrap();
        let at = Utc.with_ymd_and_hms(2024, 3, 4, 20, 55, 0).unwrap();
        assert!(!timing.is_end_of_day(before));
        assert!(timing.is_end_of_day(at));

        // July 1 2024 is EDT (UTC-4)
        let summer = Utc.with_ymd_and_hms(2024, 7, 1, 19, 56, 0).unwrap();
        assert!(timing.is_end_of_day(summer));
    }

    #[test]
    fn window_closes_at_session_close() {
        let timing = RuleTiming::default();
        let last = Utc.with_ymd_and_hms(2024, 3, 4, 20, 59, 59).unwrap();
        let close = Utc.with_ymd_and_hms(2024, 3, 4, 21, 0, 0).unwrap();
        let evening = Utc.with_ymd_and_hms(2024, 3, 4, 23, 30, 0).unwrap();
        assert!(timing.is_end_of_day(last));
        assert!(!timing.is_end_of_day(close));
        assert!(!timing.is_end_of_day(evening));
    }

    #[test]
    fn window_wrapping_midnight() {
        let timing = RuleTiming {
            session_close: NaiveTime::from_hms_opt(0, 2, 0).unwrap(),
            ..RuleTiming::default()
        };
        // 23:57 and 00:01 New York, EST
        let before_midnight = Utc.with_ymd_and_hms(2024, 3, 5, 4, 57, 0).unwrap();
        let after_midnight = Utc.with_ymd_and_hms(2024, 3, 5, 5, 1, 0).unwrap();
        let after_close = Utc.with_ymd_and_hms(2024, 3, 5, 5, 2, 0).unwrap();
        assert!(timing.is_end_of_day(before_midnight));
        assert!(timing.is_end_of_day(after_midnight));
        assert!(!timing.is_end_of_day(after_close));
    }

    #[test]
    fn morning_is_not_end_of_day() {
        let timing = RuleTiming::default();
        let open = Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap();
        assert!(!timing.is_end_of_day(open));
    }
}
