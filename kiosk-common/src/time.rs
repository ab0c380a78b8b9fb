//! Timestamp utilities

use chrono::{DateTime, Datelike, Duration as ChronoDuration, NaiveDate, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Convert whole seconds to a std duration
pub fn secs_to_duration(secs: u64) -> std::time::Duration {
    std::time::Duration::from_secs(secs)
}

/// Monday of the (UTC) week containing `date`
///
/// Weeks run Monday through Sunday, so a Sunday maps to the Monday six days
/// earlier.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_since_monday = date.weekday().num_days_from_monday() as i64;
    date - ChronoDuration::days(days_since_monday)
}

/// Monday of the current UTC week
pub fn current_week_start() -> NaiveDate {
    week_start(now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_now_returns_valid_timestamp() {
        let timestamp = now();
        assert!(timestamp.timestamp() > 946_684_800); // 2000-01-01 00:00:00 UTC
    }

    #[test]
    fn test_secs_to_duration() {
        assert_eq!(secs_to_duration(0), Duration::ZERO);
        assert_eq!(secs_to_duration(50), Duration::from_millis(50_000));
        assert_eq!(secs_to_duration(3600).as_secs(), 3600);
    }

    #[test]
    fn test_week_start_on_monday_is_same_day() {
        // 2024-06-10 was a Monday
        assert_eq!(week_start(date(2024, 6, 10)), date(2024, 6, 10));
    }

    #[test]
    fn test_week_start_midweek() {
        assert_eq!(week_start(date(2024, 6, 13)), date(2024, 6, 10));
    }

    #[test]
    fn test_week_start_sunday_maps_to_previous_monday() {
        assert_eq!(week_start(date(2024, 6, 16)), date(2024, 6, 10));
    }

    #[test]
    fn test_week_start_crosses_month_boundary() {
        // 2024-09-01 was a Sunday
        assert_eq!(week_start(date(2024, 9, 1)), date(2024, 8, 26));
    }
}
