//! HTML escaping for dashboard markup

use gt_core::value::to_display_string;
use gt_core::Value;

/// Escape `& < > " '` as HTML entities
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}

/// Escape any value; missing and null values give an empty string
pub fn escape_html_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(v) => escape_html(&to_display_string(v)),
    }
}
