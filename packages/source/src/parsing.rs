//! Field parsing helpers shared by the sources and the cleaning stage.
//!
//! Hotspot CSVs come from several INPE exports and older mirror files, so
//! timestamps and numbers show up in a handful of formats. Every helper
//! returns `None` for anything it does not recognize.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

/// Datetime formats tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

/// Date-only formats tried after the datetime formats. A bare date is
/// interpreted as midnight UTC.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%Y/%m/%d"];

/// Parses a hotspot timestamp as UTC.
///
/// Accepts ISO 8601 with or without a `T` separator, fractional seconds or
/// a trailing `Z`, RFC 3339 offsets and Brazilian `dd/mm/yyyy` dates.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    let s = s.strip_suffix('Z').unwrap_or(s);
    for fmt in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    parse_date(s).and_then(|d| d.and_hms_opt(0, 0, 0)).map(|n| n.and_utc())
}

/// Parses a date-only string in any of the accepted date formats.
#[must_use]
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

/// Parses a decimal number, accepting a comma as the decimal separator.
/// Returns `None` for empty, unparseable or non-finite values.
#[must_use]
pub fn parse_f64(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let value = s
        .parse::<f64>()
        .ok()
        .or_else(|| s.replace(',', ".").parse::<f64>().ok())?;
    value.is_finite().then_some(value)
}

/// Parses a confidence score, clamping it to 0-100.
#[must_use]
pub fn parse_confidence(s: &str) -> Option<u8> {
    let value = parse_f64(s)?;
    if value < 0.0 {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(value.round().min(100.0) as u8)
}

/// Parses a latitude/longitude pair. Returns `None` if either is missing
/// or unparseable.
#[must_use]
pub fn parse_lat_lng(lat: Option<&str>, lng: Option<&str>) -> Option<(f64, f64)> {
    let latitude = parse_f64(lat?)?;
    let longitude = parse_f64(lng?)?;
    Some((latitude, longitude))
}

/// Returns `None` for empty or whitespace-only cells, else the trimmed text.
#[must_use]
pub fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_with_space_separator() {
        let dt = parse_timestamp("2024-08-15 14:30:00").unwrap();
        assert_eq!(dt.to_string(), "2024-08-15 14:30:00 UTC");
    }

    #[test]
    fn parses_iso_with_t_and_z() {
        let dt = parse_timestamp("2024-08-15T14:30:00.000Z").unwrap();
        assert_eq!(dt.to_string(), "2024-08-15 14:30:00 UTC");
        let dt = parse_timestamp("2024-08-15T14:30:00").unwrap();
        assert_eq!(dt.to_string(), "2024-08-15 14:30:00 UTC");
    }

    #[test]
    fn parses_offset_into_utc() {
        let dt = parse_timestamp("2024-08-15T11:30:00-03:00").unwrap();
        assert_eq!(dt.to_string(), "2024-08-15 14:30:00 UTC");
    }

    #[test]
    fn parses_brazilian_dates() {
        let dt = parse_timestamp("15/08/2024 14:30:00").unwrap();
        assert_eq!(dt.to_string(), "2024-08-15 14:30:00 UTC");
        let dt = parse_timestamp("15/08/2024").unwrap();
        assert_eq!(dt.to_string(), "2024-08-15 00:00:00 UTC");
    }

    #[test]
    fn parses_bare_date_as_midnight() {
        let dt = parse_timestamp("2024-08-15").unwrap();
        assert_eq!(dt.to_string(), "2024-08-15 00:00:00 UTC");
    }

    #[test]
    fn rejects_garbage_timestamps() {
        assert!(parse_timestamp("not-a-date").is_none());
        assert!(parse_timestamp("").is_none());
        assert!(parse_timestamp("2024-13-45").is_none());
    }

    #[test]
    fn parses_decimal_comma() {
        assert_eq!(parse_f64("-12,5"), Some(-12.5));
        assert_eq!(parse_f64(" 3.25 "), Some(3.25));
        assert_eq!(parse_f64("NaN"), None);
        assert_eq!(parse_f64(""), None);
    }

    #[test]
    fn clamps_confidence() {
        assert_eq!(parse_confidence("87"), Some(87));
        assert_eq!(parse_confidence("150"), Some(100));
        assert_eq!(parse_confidence("-1"), None);
    }

    #[test]
    fn lat_lng_requires_both() {
        assert_eq!(parse_lat_lng(Some("-10.5"), Some("-50.1")), Some((-10.5, -50.1)));
        assert_eq!(parse_lat_lng(None, Some("-50.1")), None);
        assert_eq!(parse_lat_lng(Some("x"), Some("-50.1")), None);
    }
}
