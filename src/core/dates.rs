//! Date parsing shared by the aggregation, filter, and report code.
//!
//! Stored dates are ISO 8601 strings in one of three shapes: a plain calendar day
//! (`2024-01-02`), a naive timestamp (`2024-01-02T10:30:00.000`), or an RFC 3339
//! timestamp with an offset. Offsets are not normalized; a timestamp lands on the
//! calendar day written in it.

use crate::errors::{Error, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

/// Format of day keys and ISO dates.
pub const ISO_DATE: &str = "%Y-%m-%d";

const NAIVE_TIMESTAMP_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

/// Parses a stored date into a local timestamp.
///
/// # Errors
/// Returns [`Error::InvalidDate`] when `value` matches none of the accepted shapes.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime> {
    let trimmed = value.trim();

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(with_offset.naive_local());
    }

    if let Some(naive) = NAIVE_TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
    {
        return Ok(naive);
    }

    NaiveDate::parse_from_str(trimmed, ISO_DATE)
        .map(|day| day.and_time(NaiveTime::MIN))
        .map_err(|_| Error::InvalidDate {
            value: value.to_string(),
        })
}

/// Parses a strict `YYYY-MM-DD` calendar day.
///
/// # Errors
/// Returns [`Error::InvalidDate`] for anything else.
pub fn parse_day(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), ISO_DATE).map_err(|_| Error::InvalidDate {
        value: value.to_string(),
    })
}

/// Current time as an RFC 3339 string, used to default missing transaction dates.
#[must_use]
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Today's date as `YYYY-MM-DD`, used to default missing payment dates.
#[must_use]
pub fn today() -> String {
    Utc::now().date_naive().format(ISO_DATE).to_string()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_plain_day() {
        let ts = parse_timestamp("2024-01-02").unwrap();
        assert_eq!(ts.date(), NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(ts.hour(), 0);
    }

    #[test]
    fn test_parse_rfc3339_keeps_written_day() {
        let ts = parse_timestamp("2024-01-02T23:30:00+05:30").unwrap();
        assert_eq!(ts.day(), 2);
        assert_eq!(ts.hour(), 23);

        let zulu = parse_timestamp("2024-03-05T10:15:00.000Z").unwrap();
        assert_eq!(zulu.month(), 3);
        assert_eq!(zulu.minute(), 15);
    }

    #[test]
    fn test_parse_naive_timestamps() {
        assert_eq!(parse_timestamp("2024-01-02T08:00:00").unwrap().hour(), 8);
        assert_eq!(parse_timestamp("2024-01-02T08:00:00.250").unwrap().hour(), 8);
        assert_eq!(parse_timestamp("2024-01-02 17:45:00").unwrap().hour(), 17);
        assert_eq!(parse_timestamp("2024-01-02T09:10").unwrap().minute(), 10);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "yesterday", "2024-13-01", "01/02/2024"] {
            assert!(matches!(
                parse_timestamp(bad),
                Err(Error::InvalidDate { .. })
            ));
        }
        assert!(parse_day("2024-01-02T00:00:00").is_err());
    }

    #[test]
    fn test_defaults_are_parseable() {
        assert!(parse_timestamp(&now_timestamp()).is_ok());
        assert!(parse_day(&today()).is_ok());
    }
}
