use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;
use wn_core::{Error, Result};

/// Naive layouts seen across providers, all read as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y%m%dT%H%M%SZ", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Parses a provider timestamp: RFC 3339, GDELT's compact form, a naive
/// date-time, or a bare date (midnight UTC).
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc());
        }
    }
    Err(Error::InvalidTimestamp(value.to_string()))
}

/// Like [`parse_timestamp`], but a missing or unreadable value becomes now.
pub fn parse_or_now(value: Option<&str>) -> DateTime<Utc> {
    match value.map(parse_timestamp) {
        Some(Ok(at)) => at,
        Some(Err(e)) => {
            warn!("{}, using current time", e);
            Utc::now()
        }
        None => Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    #[test]
    fn test_parse_known_layouts() {
        assert_eq!(parse_timestamp("2025-01-02T10:15:00Z").unwrap(), utc(2025, 1, 2, 10, 15, 0));
        assert_eq!(parse_timestamp("2025-01-02T12:15:00+02:00").unwrap(), utc(2025, 1, 2, 10, 15, 0));
        assert_eq!(parse_timestamp("20250102T101500Z").unwrap(), utc(2025, 1, 2, 10, 15, 0));
        assert_eq!(parse_timestamp("2025-01-02 10:15:00").unwrap(), utc(2025, 1, 2, 10, 15, 0));
        assert_eq!(parse_timestamp(" 2025-01-02 ").unwrap(), utc(2025, 1, 2, 0, 0, 0));
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(matches!(parse_timestamp("yesterday"), Err(Error::InvalidTimestamp(_))));
    }

    #[test]
    fn test_parse_or_now_falls_back() {
        let before = Utc::now();
        assert!(parse_or_now(Some("soon")) >= before);
        assert!(parse_or_now(None) >= before);
        assert_eq!(parse_or_now(Some("2025-01-02")), utc(2025, 1, 2, 0, 0, 0));
    }
}
