//! Lenient readers for raw upstream records.
//!
//! The brokerage returns most numbers as strings (`"150.0000"`) and is not
//! consistent about nulls. Every reader here answers `None` instead of
//! failing, so one malformed field never aborts a whole listing.

use serde_json::Value;

use crate::UtcDateTime;

/// Reads `key` from a record as a finite float.
pub fn number(record: &Value, key: &str) -> Option<f64> {
    record.get(key).and_then(to_number)
}

/// Converts a JSON number or numeric string to a finite float.
pub fn to_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    parsed.is_finite().then_some(parsed)
}

/// Reads `key` as an integer, truncating fractional values toward zero.
pub fn integer(record: &Value, key: &str) -> Option<i64> {
    let value = record.get(key)?;
    if let Some(exact) = value.as_i64() {
        return Some(exact);
    }

    let parsed = to_number(value)?;
    if parsed.abs() >= i64::MAX as f64 {
        return None;
    }
    Some(parsed.trunc() as i64)
}

/// Reads `key` as a non-empty string.
pub fn text(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        _ => None,
    }
}

/// Reads `key` as a string, falling back to `""`.
pub fn text_or_empty(record: &Value, key: &str) -> String {
    text(record, key).unwrap_or_default()
}

pub fn boolean(record: &Value, key: &str) -> Option<bool> {
    match record.get(key)? {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

/// Reads `key` as an RFC3339 timestamp normalized to UTC.
pub fn timestamp(record: &Value, key: &str) -> Option<String> {
    let raw = text(record, key)?;
    UtcDateTime::parse_any_offset(&raw)
        .ok()
        .map(UtcDateTime::format_rfc3339)
}

/// True for entries that carry data: a JSON object with at least one field.
pub fn is_record(value: &Value) -> bool {
    value.as_object().is_some_and(|fields| !fields.is_empty())
}

/// Extracts the trailing id segment from an instrument URL.
///
/// `https://api.robinhood.com/options/instruments/abc-123/` yields `abc-123`.
pub fn url_id(url: &str) -> Option<&str> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_string_encoded_numbers() {
        let record = json!({ "strike_price": "150.00", "delta": "0.3245", "gamma": 0.01 });
        assert_eq!(number(&record, "strike_price"), Some(150.0));
        assert_eq!(number(&record, "delta"), Some(0.3245));
        assert_eq!(number(&record, "gamma"), Some(0.01));
    }

    #[test]
    fn invalid_numeric_strings_become_none() {
        let record = json!({ "bid_price": "not_a_number", "ask_price": null, "vega": "NaN" });
        assert_eq!(number(&record, "bid_price"), None);
        assert_eq!(number(&record, "ask_price"), None);
        assert_eq!(number(&record, "vega"), None);
        assert_eq!(number(&record, "missing"), None);
    }

    #[test]
    fn integers_accept_float_strings() {
        let record = json!({ "open_interest": "1520.0000", "volume": 37, "bad": "x" });
        assert_eq!(integer(&record, "open_interest"), Some(1520));
        assert_eq!(integer(&record, "volume"), Some(37));
        assert_eq!(integer(&record, "bad"), None);
    }

    #[test]
    fn timestamps_are_normalized_to_utc() {
        let record = json!({
            "created_at": "2025-01-15T10:00:00Z",
            "updated_at": "2025-01-15T05:00:00-05:00",
            "garbage": "yesterday"
        });
        assert_eq!(
            timestamp(&record, "created_at").as_deref(),
            Some("2025-01-15T10:00:00Z")
        );
        assert_eq!(
            timestamp(&record, "updated_at").as_deref(),
            Some("2025-01-15T10:00:00Z")
        );
        assert_eq!(timestamp(&record, "garbage"), None);
    }

    #[test]
    fn extracts_instrument_id_from_url() {
        assert_eq!(
            url_id("https://api.robinhood.com/options/instruments/abc-123/"),
            Some("abc-123")
        );
        assert_eq!(url_id("def-456"), Some("def-456"));
        assert_eq!(url_id("https://"), None);
    }

    #[test]
    fn empty_and_null_entries_are_not_records() {
        assert!(!is_record(&Value::Null));
        assert!(!is_record(&json!({})));
        assert!(!is_record(&json!([1])));
        assert!(is_record(&json!({ "strike_price": "1" })));
    }
}
