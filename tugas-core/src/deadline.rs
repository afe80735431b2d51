//! Deadline parsing module
//!
//! Accepted forms, tried in order (first match wins):
//! - `DD-MM-YYYY HH:MM:SS`: exact instant
//! - `DD-MM-YYYY HH:MM`: that minute, seconds = 0
//! - `DD-MM-YYYY`: that date at 23:59:59 (end of day)
//!
//! All instants are local wall-clock time.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};
use regex::Regex;
use std::sync::LazyLock;

use crate::error::{CoreError, Result};

/// Date only, resolved to end of day
pub const DATE_FORMAT: &str = "%d-%m-%Y";
/// Date and minute
pub const DATE_TIME_FORMAT: &str = "%d-%m-%Y %H:%M";
/// Date and second
pub const DATE_TIME_SECONDS_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Time of day a date-only deadline resolves to.
pub static END_OF_DAY: LazyLock<NaiveTime> = LazyLock::new(|| {
    NaiveTime::from_hms_opt(23, 59, 59).expect("23:59:59 is a valid time of day")
});

// Leading date part of a stored deadline, whatever follows it
static DATE_PREFIX_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,2}-\d{1,2}-\d{4})(?:\s|$)")
        .expect("Invalid regex pattern - this is a compile-time constant")
});

/// Parse a deadline string into a local instant
///
/// Fails with [`CoreError::InvalidDeadlineFormat`] when none of the
/// accepted forms match.
pub fn parse(input: &str) -> Result<DateTime<Local>> {
    let input = input.trim();
    let naive = parse_naive(input)?;
    to_local(naive, input)
}

fn parse_naive(input: &str) -> Result<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, DATE_TIME_SECONDS_FORMAT) {
        return Ok(dt);
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(input, DATE_TIME_FORMAT) {
        return Ok(dt);
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, DATE_FORMAT) {
        return Ok(date.and_time(*END_OF_DAY));
    }

    Err(CoreError::invalid_deadline(input))
}

fn to_local(naive: NaiveDateTime, input: &str) -> Result<DateTime<Local>> {
    // earliest() picks the first of two candidates in a DST fold
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| CoreError::invalid_deadline(input))
}

/// Resolve only the date part of a deadline, always at 23:59:59
///
/// Any time component in the input is ignored.
pub fn resolve_end_of_day(input: &str) -> Result<DateTime<Local>> {
    let input = input.trim();
    let date_part = DATE_PREFIX_REGEX
        .captures(input)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| CoreError::invalid_deadline(input))?
        .as_str();

    let date = NaiveDate::parse_from_str(date_part, DATE_FORMAT)
        .map_err(|_| CoreError::invalid_deadline(input))?;

    to_local(date.and_time(*END_OF_DAY), input)
}

/// Whether a resolved deadline carries an explicit time of day
///
/// A deadline explicitly set to 23:59:59 cannot be told apart from a
/// date-only one and reports `false`.
pub fn has_explicit_time(instant: &DateTime<Local>) -> bool {
    instant.time() != *END_OF_DAY
}

/// Canonical text form of a resolved deadline
///
/// Parsing the returned string yields the same instant.
pub fn format_deadline(instant: &DateTime<Local>) -> String {
    if !has_explicit_time(instant) {
        instant.format(DATE_FORMAT).to_string()
    } else if instant.second() == 0 {
        instant.format(DATE_TIME_FORMAT).to_string()
    } else {
        instant.format(DATE_TIME_SECONDS_FORMAT).to_string()
    }
}

/// Human-readable remaining time, e.g. "2 hari 3 jam 15 menit"
pub fn format_remaining(remaining: Duration) -> String {
    if remaining <= Duration::zero() {
        return "sudah lewat".to_string();
    }

    let total = remaining.num_seconds();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;

    let mut parts = Vec::new();
    if days > 0 {
        parts.push(format!("{} hari", days));
    }
    if hours > 0 {
        parts.push(format!("{} jam", hours));
    }
    if minutes > 0 {
        parts.push(format!("{} menit", minutes));
    }

    if parts.is_empty() {
        format!("{} detik", total)
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_date_and_minute() {
        let dt = parse("15-06-2024 14:30").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 6, 15));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (14, 30, 0));
    }

    #[test]
    fn test_parse_date_and_second() {
        let dt = parse("15-06-2024 14:30:45").unwrap();
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (14, 30, 45));
    }

    #[test]
    fn test_parse_date_only_is_end_of_day() {
        let dt = parse("15-06-2024").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 6, 15));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (23, 59, 59));
        assert!(!has_explicit_time(&dt));
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(parse("  15-06-2024 ").unwrap(), parse("15-06-2024").unwrap());
    }

    #[test]
    fn test_parse_rejects_other_formats() {
        for input in ["2024/06/15", "2024-06-15", "", "besok", "32-01-2024", "15-06-2024 25:00"] {
            assert!(
                matches!(parse(input), Err(CoreError::InvalidDeadlineFormat(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_is_idempotent_through_canonical_form() {
        for input in ["15-06-2024", "1-6-2024 08:05", "15-06-2024 14:30:45", "31-12-2030 23:59"] {
            let first = parse(input).unwrap();
            let again = parse(&format_deadline(&first)).unwrap();
            assert_eq!(first, again, "{input:?}");
        }
    }

    #[test]
    fn test_format_deadline_picks_shortest_form() {
        assert_eq!(format_deadline(&parse("1-6-2024").unwrap()), "01-06-2024");
        assert_eq!(format_deadline(&parse("01-06-2024 8:05").unwrap()), "01-06-2024 08:05");
        assert_eq!(
            format_deadline(&parse("01-06-2024 08:05:09").unwrap()),
            "01-06-2024 08:05:09"
        );
    }

    #[test]
    fn test_resolve_end_of_day_ignores_time() {
        let dt = resolve_end_of_day("15-06-2024 09:00").unwrap();
        assert_eq!(dt, parse("15-06-2024").unwrap());
        assert!(resolve_end_of_day("2024/06/15").is_err());
    }

    #[test]
    fn test_explicit_time() {
        assert!(has_explicit_time(&parse("15-06-2024 14:30").unwrap()));
        // Indistinguishable from a date-only deadline
        assert!(!has_explicit_time(&parse("15-06-2024 23:59:59").unwrap()));
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(Duration::seconds(45)), "45 detik");
        assert_eq!(format_remaining(Duration::minutes(90)), "1 jam 30 menit");
        assert_eq!(
            format_remaining(Duration::days(2) + Duration::hours(3)),
            "2 hari 3 jam"
        );
        assert_eq!(format_remaining(Duration::seconds(-5)), "sudah lewat");
    }
}
