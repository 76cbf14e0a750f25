//! Loose value coercions
//!
//! Script-facing helpers read values that were written by many different
//! producers, so conversions follow the lenient rules scripts expect:
//! `"12"` is a number, `1` and `1.0` are the same value, and `null` counts
//! as zero when a number is requested.

use serde_json::Value;

/// Convert a value to a number (NaN when it has no numeric reading)
///
/// - numbers as-is
/// - strings are trimmed; empty is 0, `0x`/`0o`/`0b` prefixes are honoured
/// - booleans are 1/0, null is 0
/// - arrays and objects are NaN
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => parse_number(s),
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null => 0.0,
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

fn parse_number(s: &str) -> f64 {
    let s = s.trim();
    if s.is_empty() {
        return 0.0;
    }

    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&s[2..], radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    match s.parse::<f64>() {
        // Rust also accepts "inf" and "nan", scripts do not
        Ok(n) if n.is_finite() => n,
        Ok(n) if s.chars().any(|c| c.is_ascii_digit()) => n,
        _ => f64::NAN,
    }
}

/// Format a number the way scripts print it (`1` rather than `1.0`)
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e21 {
        return format!("{:.0}", n);
    }
    n.to_string()
}

/// Convert a value to its display string
///
/// Composite values are rendered as compact JSON.
pub fn to_display_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.as_f64().map(format_number).unwrap_or_else(|| n.to_string()),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Primitive equality: numbers compare numerically, composites never match
///
/// Two arrays or objects are always considered different, even when they
/// hold the same content.
pub fn loosely_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Null, Value::Null) => true,
        _ => false,
    }
}
