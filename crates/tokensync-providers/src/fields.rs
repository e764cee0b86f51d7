//! Field lookup helpers for schemas that rename fields between tool versions.
//!
//! Each helper takes a list of candidate paths and returns the first match.

use serde_json::Value;
use tokensync_types::timestamp_from_value;

pub(crate) fn find_value<'a>(value: &'a Value, paths: &[&[&str]]) -> Option<&'a Value> {
    'paths: for path in paths {
        let mut current = value;
        for key in *path {
            match current.get(*key) {
                Some(next) => current = next,
                None => continue 'paths,
            }
        }
        if !current.is_null() {
            return Some(current);
        }
    }
    None
}

pub(crate) fn find_str<'a>(value: &'a Value, paths: &[&[&str]]) -> Option<&'a str> {
    paths
        .iter()
        .filter_map(|path| find_value(value, &[*path]))
        .find_map(|v| v.as_str().filter(|s| !s.is_empty()))
}

/// Accepts non-negative integers, floats (truncated) and numeric strings.
pub(crate) fn find_u64(value: &Value, paths: &[&[&str]]) -> Option<u64> {
    paths
        .iter()
        .filter_map(|path| find_value(value, &[*path]))
        .find_map(as_u64_lenient)
}

pub(crate) fn find_timestamp(value: &Value, paths: &[&[&str]]) -> Option<String> {
    paths
        .iter()
        .filter_map(|path| find_value(value, &[*path]))
        .find_map(timestamp_from_value)
}

fn as_u64_lenient(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_matching_path_wins() {
        let value = json!({"tokensIn": 5, "usage": {"input": 9}});
        assert_eq!(find_u64(&value, &[&["inputTokens"], &["tokensIn"]]), Some(5));
        assert_eq!(find_u64(&value, &[&["usage", "input"], &["tokensIn"]]), Some(9));
        assert_eq!(find_u64(&value, &[&["missing"]]), None);
    }

    #[test]
    fn test_null_and_wrong_types_fall_through() {
        let value = json!({"a": null, "b": "12", "c": -3, "d": 2.9, "e": {"x": 1}});
        assert_eq!(find_u64(&value, &[&["a"], &["b"]]), Some(12));
        assert_eq!(find_u64(&value, &[&["c"]]), None);
        assert_eq!(find_u64(&value, &[&["d"]]), Some(2));
        assert_eq!(find_u64(&value, &[&["e"], &["d"]]), Some(2));
    }

    #[test]
    fn test_find_str_skips_empty() {
        let value = json!({"model": "", "modelId": "gpt-5"});
        assert_eq!(find_str(&value, &[&["model"], &["modelId"]]), Some("gpt-5"));
    }

    #[test]
    fn test_find_timestamp_mixed_representations() {
        let value = json!({"ts": 1_700_000_000_000i64, "time": "bogus"});
        assert_eq!(
            find_timestamp(&value, &[&["time"], &["ts"]]).as_deref(),
            Some("2023-11-14T22:13:20.000Z")
        );
    }
}
