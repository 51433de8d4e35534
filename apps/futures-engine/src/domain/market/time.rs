//! Candle timestamp normalisation.

use chrono::{DateTime, DurationRound, TimeDelta, Utc};

/// Snap `at` up to the next whole minute. Exact minute boundaries are
/// returned unchanged.
#[must_use]
pub fn snap_to_minute(at: DateTime<Utc>) -> DateTime<Utc> {
    let minute = TimeDelta::minutes(1);
    match at.duration_trunc(minute) {
        Ok(floor) if floor == at => at,
        Ok(floor) => floor + minute,
        Err(_) => at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn snaps_partial_minutes_up() {
        let at = Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 1).unwrap();
        let expected = Utc.with_ymd_and_hms(2024, 3, 4, 14, 31, 0).unwrap();
        assert_eq!(snap_to_minute(at), expected);
    }

    #[test]
    fn keeps_exact_minutes() {
        let at = Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap();
        assert_eq!(snap_to_minute(at), at);
    }

    #[test]
    fn snaps_sub_second_offsets() {
        let at = Utc.with_ymd_and_hms(2024, 3, 4, 14, 59, 0).unwrap() + TimeDelta::milliseconds(5);
        let expected = Utc.with_ymd_and_hms(2024, 3, 4, 15, 0, 0).unwrap();
        assert_eq!(snap_to_minute(at), expected);
    }
}
