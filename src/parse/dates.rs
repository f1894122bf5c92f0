//! Canonical GDELT date parsing (§4.3). Every wire date is one of
//! `YYYYMMDDHHMMSS` (14 digits), `YYYYMMDD` (8 digits), or ISO-8601; naive
//! inputs are tagged UTC, aware inputs converted to UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::GdeltError;

/// Strict variant: raises on anything that isn't one of the three known
/// shapes.
pub fn parse_strict(raw: &str) -> Result<DateTime<Utc>, GdeltError> {
    let trimmed = raw.trim();

    if trimmed.len() == 14 && trimmed.chars().all(|c| c.is_ascii_digit()) {
        let naive = NaiveDateTime::parse_from_str(trimmed, "%Y%m%d%H%M%S")
            .map_err(|e| GdeltError::Parse { line: 0, message: format!("invalid YYYYMMDDHHMMSS date {trimmed:?}: {e}") })?;
        return Ok(Utc.from_utc_datetime(&naive));
    }

    if trimmed.len() == 8 && trimmed.chars().all(|c| c.is_ascii_digit()) {
        let date = NaiveDate::parse_from_str(trimmed, "%Y%m%d")
            .map_err(|e| GdeltError::Parse { line: 0, message: format!("invalid YYYYMMDD date {trimmed:?}: {e}") })?;
        let naive = date.and_hms_opt(0, 0, 0).expect("midnight is always valid");
        return Ok(Utc.from_utc_datetime(&naive));
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    Err(GdeltError::Parse {
        line: 0,
        message: format!("unrecognized date format {trimmed:?}"),
    })
}

/// Lenient variant: returns `None` (the null marker) instead of raising.
pub fn parse_lenient(raw: &str) -> Option<DateTime<Utc>> {
    parse_strict(raw).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_timestamp() {
        let dt = parse_strict("20240115123045").unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 12:30:45 UTC");
    }

    #[test]
    fn parses_date_only_as_midnight_utc() {
        let dt = parse_strict("20240115").unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 00:00:00 UTC");
    }

    #[test]
    fn parses_iso8601_and_converts_to_utc() {
        let dt = parse_strict("2024-01-15T12:30:45+02:00").unwrap();
        assert_eq!(dt.to_string(), "2024-01-15 10:30:45 UTC");
    }

    #[test]
    fn strict_variant_errors_on_garbage() {
        assert!(parse_strict("not-a-date").is_err());
    }

    #[test]
    fn lenient_variant_returns_none_on_garbage() {
        assert_eq!(parse_lenient("not-a-date"), None);
    }
}
