//! Timestamp parsing shared by ingestion, configuration and output.

use chrono::{NaiveDate, NaiveDateTime};

/// Canonical timestamp format used for output files and report keys.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

/// Parses a timestamp in any of the layouts produced by EddyPro, Campbell
/// dataloggers and the ECCC bulk CSV service.
///
/// A bare date (`2024-06-01`) parses as midnight.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim().trim_matches('"');
    if trimmed.is_empty() {
        return None;
    }
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(parsed);
        }
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Parses the closing timestamp of a period.
///
/// Same layouts as [`parse_timestamp`], except that a bare date means the
/// last second of that day, so `2024-06-01/2024-06-02` spans both days.
pub fn parse_period_end(raw: &str) -> Option<NaiveDateTime> {
    let trimmed = raw.trim().trim_matches('"');
    match NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        Ok(date) => date.and_hms_opt(23, 59, 59),
        Err(_) => parse_timestamp(trimmed),
    }
}

/// Formats a timestamp with [`TIMESTAMP_FORMAT`].
pub fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_eddypro_and_logger_layouts() {
        let expected = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(0, 30, 0)
            .unwrap();
        assert_eq!(parse_timestamp("2024-06-01 00:30"), Some(expected));
        assert_eq!(parse_timestamp("2024-06-01 00:30:00"), Some(expected));
        assert_eq!(parse_timestamp("\"2024-06-01 00:30:00\""), Some(expected));
        assert_eq!(parse_timestamp("2024-06-01T00:30"), Some(expected));
    }

    #[test]
    fn bare_date_is_midnight() {
        let parsed = parse_timestamp("2024-06-01").unwrap();
        assert_eq!(format_timestamp(parsed), "2024-06-01 00:00");
    }

    #[test]
    fn bare_period_end_is_end_of_day() {
        let end = parse_period_end("2024-06-02").unwrap();
        assert_eq!(end.to_string(), "2024-06-02 23:59:59");
        assert_eq!(
            parse_period_end("2024-06-02 06:00"),
            parse_timestamp("2024-06-02 06:00")
        );
        assert_eq!(parse_period_end("soon"), None);
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
