//! Display formatting for numbers, sizes, power, durations and timestamps
//!
//! All formatters are pure. Missing input (`None`) and NaN render as the
//! [`NO_VALUE`] sentinel instead of failing.

use chrono::{Local, TimeZone};

/// Default number of decimals
pub const DEFAULT_DECIMALS: usize = 1;

/// Output for missing or unusable input
pub const NO_VALUE: &str = "-";

const BYTE_UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];

fn usable(n: impl Into<Option<f64>>) -> Option<f64> {
    n.into().filter(|v| !v.is_nan())
}

/// Fraction digits needed to print any finite f64 exactly
const EXACT_FRACTION_DIGITS: usize = 1074;

/// Fixed-point formatting the way scripts print numbers
///
/// Rounds the exact binary value, with exact ties going away from zero:
/// `to_fixed(2.25, 1)` is `"2.3"` (2.25 is exact) while `to_fixed(1.45, 1)`
/// is `"1.4"` (1.45 is stored as 1.4499…). The sign is kept when a negative
/// value rounds to zero (`"-0.0"`); negative zero itself prints unsigned.
pub fn to_fixed(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let decimals = decimals.min(100);

    let exact = format!("{:.*}", EXACT_FRACTION_DIGITS, value.abs());
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(decimals))
        .collect();

    let round_up = frac_part
        .as_bytes()
        .get(decimals)
        .is_some_and(|d| *d >= b'5');
    if round_up && !increment(&mut digits) {
        digits.insert(0, b'1');
    }

    let int_len = digits.len() - decimals;
    let mut out = String::with_capacity(digits.len() + 2);
    if value < 0.0 {
        out.push('-');
    }
    out.extend(digits[..int_len].iter().map(|&d| d as char));
    if decimals > 0 {
        out.push('.');
        out.extend(digits[int_len..].iter().map(|&d| d as char));
    }
    out
}

/// Add one to a string of ASCII digits; false if it overflowed
fn increment(digits: &mut [u8]) -> bool {
    for d in digits.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            return true;
        }
    }
    false
}

/// Number with fixed decimals, or `"-"`
pub fn fmt_num(n: impl Into<Option<f64>>, decimals: usize) -> String {
    fmt_num_or(n, decimals, NO_VALUE)
}

/// Number with fixed decimals, or the given fallback
pub fn fmt_num_or(n: impl Into<Option<f64>>, decimals: usize, fallback: &str) -> String {
    match usable(n) {
        Some(v) => to_fixed(v, decimals),
        None => fallback.to_string(),
    }
}

/// Byte count in B/KB/MB/GB/TB/PB (1024 steps), sign preserved
pub fn fmt_bytes(bytes: impl Into<Option<f64>>, decimals: usize) -> String {
    let Some(bytes) = usable(bytes) else {
        return NO_VALUE.to_string();
    };

    let mut unit = 0;
    let mut value = bytes.abs();
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let sign = if bytes < 0.0 { "-" } else { "" };
    format!("{}{} {}", sign, to_fixed(value, decimals), BYTE_UNITS[unit])
}

/// Power in W, kW (from 1000) or MW (from 1 000 000), sign preserved
pub fn fmt_watt(watt: impl Into<Option<f64>>, decimals: usize) -> String {
    let Some(watt) = usable(watt) else {
        return NO_VALUE.to_string();
    };

    let abs = watt.abs();
    let sign = if watt < 0.0 { "-" } else { "" };
    let (value, unit) = if abs < 1000.0 {
        (abs, "W")
    } else if abs < 1_000_000.0 {
        (abs / 1000.0, "kW")
    } else {
        (abs / 1_000_000.0, "MW")
    };
    format!("{}{} {}", sign, to_fixed(value, decimals), unit)
}

/// Percentage value with a trailing `" %"` (the value is not scaled)
pub fn fmt_percent(value: impl Into<Option<f64>>, decimals: usize) -> String {
    match usable(value) {
        Some(v) => format!("{} %", to_fixed(v, decimals)),
        None => NO_VALUE.to_string(),
    }
}

/// Duration in milliseconds as the two largest units
///
/// `"2d 3h"`, `"1h 5m"`, `"1m 30s"` or `"42s"`; negative, infinite or
/// missing input gives `"-"`.
pub fn fmt_duration(ms: impl Into<Option<f64>>) -> String {
    let Some(ms) = usable(ms).filter(|v| *v >= 0.0 && v.is_finite()) else {
        return NO_VALUE.to_string();
    };

    let sec = (ms / 1000.0).floor() as u64;
    let d = sec / 86_400;
    let h = (sec % 86_400) / 3600;
    let m = (sec % 3600) / 60;
    let s = sec % 60;

    if d > 0 {
        format!("{}d {}h", d, h)
    } else if h > 0 {
        format!("{}h {}m", h, m)
    } else if m > 0 {
        format!("{}m {}s", m, s)
    } else {
        format!("{}s", s)
    }
}

/// Timestamp (ms since epoch) as `YYYY-MM-DD HH:MM` in local time
pub fn fmt_date_time(ts: impl Into<Option<i64>>) -> String {
    fmt_date_time_in(&Local, ts)
}

/// Timestamp (ms since epoch) as `YYYY-MM-DD HH:MM` in the given zone
pub fn fmt_date_time_in<Tz: TimeZone>(tz: &Tz, ts: impl Into<Option<i64>>) -> String {
    ts.into()
        .and_then(|ts| tz.timestamp_millis_opt(ts).single())
        .map(|dt| dt.naive_local().format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| NO_VALUE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};

    #[test]
    fn test_to_fixed() {
        assert_eq!(to_fixed(1.5, 1), "1.5");
        assert_eq!(to_fixed(2.25, 1), "2.3");
        assert_eq!(to_fixed(-2.5, 0), "-3");
        assert_eq!(to_fixed(-0.0, 1), "0.0");
        assert_eq!(to_fixed(-0.04, 1), "-0.0");
        assert_eq!(to_fixed(12.0, 0), "12");
        assert_eq!(to_fixed(f64::INFINITY, 1), "Infinity");
    }

    #[test]
    fn test_to_fixed_rounds_stored_value() {
        assert_eq!(to_fixed(1.45, 1), "1.4");
        assert_eq!(to_fixed(1.005, 2), "1.00");
        assert_eq!(to_fixed(0.5, 0), "1");
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(to_fixed(-1.45, 1), "-1.4");
    }

    #[test]
    fn test_to_fixed_carries() {
        assert_eq!(to_fixed(9.96, 1), "10.0");
        assert_eq!(to_fixed(99.5, 0), "100");
        assert_eq!(to_fixed(0.999, 2), "1.00");
        assert_eq!(to_fixed(-0.96, 1), "-1.0");
    }

    #[test]
    fn test_fmt_num() {
        assert_eq!(fmt_num(3.14159, 2), "3.14");
        assert_eq!(fmt_num(7.0, DEFAULT_DECIMALS), "7.0");
        assert_eq!(fmt_num(None, 1), "-");
        assert_eq!(fmt_num(f64::NAN, 1), "-");
        assert_eq!(fmt_num_or(None, 1, "n/a"), "n/a");
    }

    #[test]
    fn test_fmt_bytes() {
        assert_eq!(fmt_bytes(0.0, 1), "0.0 B");
        assert_eq!(fmt_bytes(1023.0, 1), "1023.0 B");
        assert_eq!(fmt_bytes(1024.0, 1), "1.0 KB");
        assert_eq!(fmt_bytes(1536.0, 1), "1.5 KB");
        assert_eq!(fmt_bytes(5.0 * 1024.0 * 1024.0 * 1024.0, 2), "5.00 GB");
        assert_eq!(fmt_bytes(-1536.0, 1), "-1.5 KB");
        assert_eq!(fmt_bytes(None, 1), "-");
        assert_eq!(fmt_bytes(f64::NAN, 1), "-");
    }

    #[test]
    fn test_fmt_bytes_caps_at_petabytes() {
        let pb = 1024f64.powi(5);
        assert_eq!(fmt_bytes(pb, 1), "1.0 PB");
        assert_eq!(fmt_bytes(2048.0 * pb, 1), "2048.0 PB");
    }

    #[test]
    fn test_fmt_watt() {
        assert_eq!(fmt_watt(999.0, 1), "999.0 W");
        assert_eq!(fmt_watt(1000.0, 1), "1.0 kW");
        assert_eq!(fmt_watt(1500.0, 1), "1.5 kW");
        assert_eq!(fmt_watt(-2_000_000.0, 1), "-2.0 MW");
        assert_eq!(fmt_watt(999_999.0, 0), "1000 kW");
        assert_eq!(fmt_watt(None, 1), "-");
    }

    #[test]
    fn test_fmt_percent() {
        assert_eq!(fmt_percent(42.0, 1), "42.0 %");
        assert_eq!(fmt_percent(99.95, 0), "100 %");
        assert_eq!(fmt_percent(None, 1), "-");
    }

    #[test]
    fn test_fmt_duration() {
        assert_eq!(fmt_duration(0.0), "0s");
        assert_eq!(fmt_duration(999.0), "0s");
        assert_eq!(fmt_duration(42_000.0), "42s");
        assert_eq!(fmt_duration(90_000.0), "1m 30s");
        assert_eq!(fmt_duration(3_900_000.0), "1h 5m");
        assert_eq!(fmt_duration(2.0 * 86_400_000.0 + 3.0 * 3_600_000.0), "2d 3h");
        assert_eq!(fmt_duration(-1.0), "-");
        assert_eq!(fmt_duration(f64::NAN), "-");
        assert_eq!(fmt_duration(None), "-");
    }

    #[test]
    fn test_fmt_date_time_in() {
        // 2025-11-20 07:05:00 UTC
        let ts = 1_763_622_300_000;
        assert_eq!(fmt_date_time_in(&Utc, ts), "2025-11-20 07:05");

        let cet = FixedOffset::east_opt(3600).unwrap();
        assert_eq!(fmt_date_time_in(&cet, ts), "2025-11-20 08:05");

        assert_eq!(fmt_date_time_in(&Utc, None), "-");
        assert_eq!(fmt_date_time_in(&Utc, i64::MAX), "-");
    }

    #[test]
    fn test_fmt_date_time_local() {
        assert_eq!(fmt_date_time(None), "-");
        assert_eq!(fmt_date_time(0).len(), "1970-01-01 00:00".len());
    }
}
