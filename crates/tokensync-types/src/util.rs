use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;
use std::time::{SystemTime, UNIX_EPOCH};

/// Epoch values above this are treated as milliseconds (year 2286 in seconds).
const EPOCH_MILLIS_THRESHOLD: i64 = 9_999_999_999;

fn format_utc(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Normalize a textual timestamp to `YYYY-MM-DDTHH:MM:SS.mmmZ`.
///
/// Accepts RFC 3339, naive `T`/space separated datetimes (assumed UTC) and
/// all-digit epoch strings.
pub fn normalize_timestamp(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(format_utc(parsed.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(format_utc(DateTime::<Utc>::from_naive_utc_and_offset(
                parsed, Utc,
            )));
        }
    }
    if raw.chars().all(|ch| ch.is_ascii_digit())
        && let Ok(value) = raw.parse::<i64>()
    {
        return timestamp_from_epoch(value);
    }
    None
}

/// Convert an epoch value in seconds or milliseconds.
pub fn timestamp_from_epoch(value: i64) -> Option<String> {
    if value <= 0 {
        return None;
    }
    let dt = if value > EPOCH_MILLIS_THRESHOLD {
        DateTime::<Utc>::from_timestamp_millis(value)?
    } else {
        DateTime::<Utc>::from_timestamp(value, 0)?
    };
    Some(format_utc(dt))
}

/// Interpret a JSON value that may hold a timestamp string or an epoch number.
pub fn timestamp_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => normalize_timestamp(s),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(timestamp_from_epoch),
        _ => None,
    }
}

/// Milliseconds since the Unix epoch (0 for pre-epoch times).
pub fn system_time_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

pub fn timestamp_from_system_time(time: SystemTime) -> String {
    format_utc(DateTime::<Utc>::from(time))
}

/// UTC calendar date (`YYYY-MM-DD`) of an ISO-8601 timestamp.
pub fn date_key(timestamp: &str) -> Option<String> {
    let normalized = normalize_timestamp(timestamp)?;
    let parsed = DateTime::parse_from_rfc3339(&normalized).ok()?;
    Some(parsed.with_timezone(&Utc).format("%Y-%m-%d").to_string())
}

/// Current time in the canonical record format.
pub fn now_timestamp() -> String {
    format_utc(Utc::now())
}
