//! JSON helpers that fall back instead of failing

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Fallback of [`json_stringify`] when no other is given
pub const DEFAULT_JSON_FALLBACK: &str = "{}";

/// Parse JSON text, returning `fallback` for missing, empty or invalid input
///
/// Input that is valid JSON but does not fit `T` also yields the fallback.
pub fn json_parse<T: DeserializeOwned>(input: Option<&str>, fallback: T) -> T {
    match input {
        None | Some("") => fallback,
        Some(text) => serde_json::from_str(text).unwrap_or(fallback),
    }
}

/// Serialize to JSON text, returning the fallback (default `"{}"`) on failure
pub fn json_stringify<T: Serialize + ?Sized>(value: &T, fallback: Option<&str>) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| fallback.unwrap_or(DEFAULT_JSON_FALLBACK).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::collections::HashMap;

    #[test]
    fn test_parse_valid() {
        let value: Value = json_parse(Some(r#"{"a":[1,2]}"#), Value::Null);
        assert_eq!(value, json!({"a": [1, 2]}));

        let n: i64 = json_parse(Some("42"), 0);
        assert_eq!(n, 42);
    }

    #[test]
    fn test_parse_fallbacks() {
        assert_eq!(json_parse(Some("not json"), json!({"x": 1})), json!({"x": 1}));
        assert_eq!(json_parse(Some(""), json!([])), json!([]));
        assert_eq!(json_parse(None, json!("fb")), json!("fb"));

        // Valid JSON of the wrong shape
        let n: u8 = json_parse(Some("\"text\""), 7);
        assert_eq!(n, 7);
    }

    #[test]
    fn test_stringify() {
        assert_eq!(json_stringify(&json!({"a": 1}), None), r#"{"a":1}"#);
        assert_eq!(json_stringify("text", None), "\"text\"");
    }

    #[test]
    fn test_stringify_failure_uses_fallback() {
        // Tuple keys cannot be JSON object keys
        let map: HashMap<(i32, i32), i32> = HashMap::from([((1, 2), 3)]);
        assert_eq!(json_stringify(&map, None), "{}");
        assert_eq!(json_stringify(&map, Some("null")), "null");
    }

    #[test]
    fn test_roundtrip_preserves_value() {
        let original = json!({"name": "Backup", "ok": true, "sizes": [1.5, 2, null]});
        let text = json_stringify(&original, None);
        assert_eq!(json_parse(Some(text.as_str()), Value::Null), original);
    }
}
