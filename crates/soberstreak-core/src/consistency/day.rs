//! Calendar-day keys (`YYYY-MM-DD`).

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::error::ValidationError;

pub const DAY_FORMAT: &str = "%Y-%m-%d";

pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

/// Parse a day key. Empty input is an error; callers that treat "" as
/// "never" should check for it first.
pub fn parse_day(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), DAY_FORMAT)
        .map_err(|_| ValidationError::InvalidDay(s.to_string()))
}

/// The calendar day `instant` falls on in `tz`.
pub fn day_of<Tz: TimeZone>(instant: &DateTime<Tz>) -> NaiveDate {
    instant.date_naive()
}

/// Whole calendar days from `from` to `to`, negative if `to` is earlier.
pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    to.signed_duration_since(from).num_days()
}

/// [`days_between`] over day keys.
pub fn days_between_keys(from: &str, to: &str) -> Result<i64, ValidationError> {
    Ok(days_between(parse_day(from)?, parse_day(to)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn days_between_crosses_month_and_leap_day() {
        assert_eq!(days_between_keys("2024-02-28", "2024-03-01").unwrap(), 2);
        assert_eq!(days_between_keys("2023-02-28", "2023-03-01").unwrap(), 1);
        assert_eq!(days_between_keys("2024-03-01", "2024-02-28").unwrap(), -2);
        assert_eq!(days_between_keys("2024-12-31", "2025-01-01").unwrap(), 1);
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!(parse_day("").is_err());
        assert!(parse_day("2024-13-01").is_err());
        assert!(parse_day("yesterday").is_err());
    }

    #[test]
    fn format_round_trips() {
        let day = parse_day("2024-07-04").unwrap();
        assert_eq!(format_day(day), "2024-07-04");
    }

    #[test]
    fn day_of_uses_zone() {
        let instant: DateTime<Utc> = "2024-07-04T23:30:00Z".parse().unwrap();
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        assert_eq!(format_day(day_of(&instant)), "2024-07-04");
        assert_eq!(format_day(day_of(&instant.with_timezone(&tokyo))), "2024-07-05");
    }
}
