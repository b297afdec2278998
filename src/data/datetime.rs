use chrono::{NaiveDate, NaiveDateTime};
use serde::Serializer;

/// Sentinel value returned by `detect_date_format` when the column contains
/// RFC 3339 / ISO 8601 timestamps (e.g. `2025-03-10T22:26:28.987Z`).
pub const RFC3339_FORMAT: &str = "__rfc3339__";

/// Layout used whenever a timestamp is turned back into text.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Formats tried when sniffing a timestamp column.
pub const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
];

/// Detect the most likely date format from a slice of string values.
/// Returns the format with the highest parse success rate.
pub fn detect_date_format(values: &[String]) -> Option<&'static str> {
    let sample: Vec<&str> = values
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .take(100)
        .collect();

    if sample.is_empty() {
        return None;
    }

    let rfc3339_valid = sample
        .iter()
        .filter(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok())
        .count();
    let mut best_score = rfc3339_valid as f64 / sample.len() as f64;
    let mut best_format = (rfc3339_valid > 0).then_some(RFC3339_FORMAT);

    for &fmt in DATE_FORMATS {
        let valid = sample
            .iter()
            .filter(|s| parse_timestamp(s, fmt).is_some())
            .count();
        let score = valid as f64 / sample.len() as f64;
        if score > best_score {
            best_score = score;
            best_format = Some(fmt);
        }
    }

    best_format
}

/// Parse one value with the given format. Zoned RFC 3339 values keep their
/// recorded wall-clock time and drop the offset.
pub fn parse_timestamp(value: &str, format: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if format == RFC3339_FORMAT {
        return chrono::DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.naive_local());
    }

    NaiveDateTime::parse_from_str(value, format)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, format)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse a whole column. Returns `None` unless more than 70% of the non-empty
/// cells are timestamps.
pub fn column_to_timestamps(data: &[String]) -> Option<Vec<Option<NaiveDateTime>>> {
    let format = detect_date_format(data)?;
    let parsed: Vec<Option<NaiveDateTime>> =
        data.iter().map(|s| parse_timestamp(s, format)).collect();

    let non_empty = data.iter().filter(|s| !s.trim().is_empty()).count();
    let valid = parsed.iter().filter(|p| p.is_some()).count();
    if non_empty > 0 && valid as f64 / non_empty as f64 > 0.7 {
        Some(parsed)
    } else {
        None
    }
}

pub fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

/// `serialize_with` adapter writing timestamps in `TIMESTAMP_FORMAT`.
pub fn serialize_timestamp<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(&ts.format(TIMESTAMP_FORMAT))
}

/// Seconds since the epoch, the x coordinate used by the chart renderer.
pub fn to_epoch_seconds(ts: &NaiveDateTime) -> f64 {
    ts.and_utc().timestamp_millis() as f64 / 1000.0
}

pub fn from_epoch_seconds(secs: f64) -> Option<NaiveDateTime> {
    chrono::DateTime::from_timestamp_millis((secs * 1000.0).round() as i64).map(|dt| dt.naive_utc())
}
