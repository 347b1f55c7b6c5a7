//! Various small helper functions

mod backoff;

pub use backoff::Backoff;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::num::ParseIntError;
use std::time::Duration;

/// Parses a Duration from a string containing seconds.
/// Useful for command line parsing
pub fn parse_seconds(src: &str) -> Result<Duration, ParseIntError> {
    let seconds = src.parse::<u64>()?;
    Ok(Duration::from_secs(seconds))
}

/// Parses a timestamp in one of the formats commonly emitted by web frameworks.
///
/// Accepted are RFC 3339 (with any offset), `YYYY-MM-DD HH:MM:SS` and plain dates.
/// Timestamps without an offset are interpreted as UTC.
pub fn parse_timestamp(src: &str) -> Option<DateTime<Utc>> {
    let src = src.trim();

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(src) {
        return Some(timestamp.with_timezone(&Utc));
    }

    for format in &["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(src, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(src, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod does {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parse_seconds_into_duration() {
        assert_eq!(parse_seconds("42"), Ok(Duration::from_secs(42)));
        assert!(parse_seconds("forty-two").is_err());
    }

    #[test]
    fn parse_rfc3339_with_offset() {
        let timestamp = parse_timestamp("2024-03-01T10:00:00+07:00").unwrap();
        assert_eq!(timestamp.hour(), 3);
    }

    #[test]
    fn parse_framework_timestamps() {
        assert!(parse_timestamp("2024-03-01 10:00:00").is_some());
        assert!(parse_timestamp("2024-03-01T10:00:00.000000Z").is_some());
        assert!(parse_timestamp("2024-03-01").is_some());
    }

    #[test]
    fn reject_garbage() {
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
    }
}
