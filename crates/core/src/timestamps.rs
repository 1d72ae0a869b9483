//! Lenient timestamp parsing for backend date fields.
//!
//! Accepted shapes, tried in order:
//! - RFC 3339 with offset (`2024-01-05T08:00:00Z`, `2024-01-05T15:00:00+07:00`), converted to
//!   the display offset
//! - naive date-time (`2024-01-05T08:00:00`, `2024-01-05T08:00:00.123`, `2024-01-05 08:00:00`),
//!   read as wall-clock time in the display offset
//! - plain date (`2024-01-05`), read as midnight in the display offset
//!
//! Anything else yields `None`; callers decide how to treat unknown dates.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

const NAIVE_DATE_TIME_FORMATS: [&str; 3] =
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Parse `raw` into a timestamp expressed in `offset`.
pub fn parse_timestamp(raw: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&offset));
    }

    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return offset.from_local_datetime(&naive).single();
        }
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| {
            offset
                .from_local_datetime(&date.and_time(NaiveTime::MIN))
                .single()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn ict() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    #[test]
    fn test_rfc3339_is_shifted_into_display_offset() {
        let dt = parse_timestamp("2024-01-31T20:00:00Z", ict()).expect("should parse");
        assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 2, 1));
        assert_eq!(dt.hour(), 3);
    }

    #[test]
    fn test_naive_and_date_only_forms() {
        for raw in [
            "2024-01-05",
            "2024-01-05T10:20:30",
            "2024-01-05T10:20:30.250",
            "2024-01-05 10:20:30",
            "2024-01-05T10:20",
        ] {
            let dt = parse_timestamp(raw, ict()).unwrap_or_else(|| panic!("{raw} should parse"));
            assert_eq!((dt.year(), dt.month(), dt.day()), (2024, 1, 5), "{raw}");
        }
    }

    #[test]
    fn test_garbage_is_none() {
        for raw in ["", "   ", "not a date", "2024-13-01", "05/01/2024", "2024-02-30"] {
            assert!(parse_timestamp(raw, ict()).is_none(), "{raw} should not parse");
        }
    }
}
