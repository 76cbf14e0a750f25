//! Date and time helpers
//!
//! Day arithmetic is done on calendar dates, never on raw millisecond
//! counts, so results do not shift across daylight-saving transitions.
//! Every helper has an `_in` variant taking an explicit time zone; the
//! plain variants use the local zone.

use std::str::FromStr;

use chrono::{Days, Local, NaiveDate, NaiveTime, TimeZone, Timelike};

/// Output pattern of [`gt_date`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateVariant {
    /// `DD.MM.YY` (`"tmj"`)
    ShortYear,
    /// `DD.MM.` (`"tm"`)
    DayMonth,
    /// `DD.MM.YYYY` (anything else)
    #[default]
    Long,
}

impl DateVariant {
    fn pattern(self) -> &'static str {
        match self {
            DateVariant::ShortYear => "%d.%m.%y",
            DateVariant::DayMonth => "%d.%m.",
            DateVariant::Long => "%d.%m.%Y",
        }
    }
}

impl FromStr for DateVariant {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "tmj" => DateVariant::ShortYear,
            "tm" => DateVariant::DayMonth,
            _ => DateVariant::Long,
        })
    }
}

/// Output pattern of [`gt_time`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeVariant {
    /// `HH:MM`
    #[default]
    HoursMinutes,
    /// `HH:MM:SS` (`"hms"`)
    HoursMinutesSeconds,
}

impl FromStr for TimeVariant {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "hms" => TimeVariant::HoursMinutesSeconds,
            _ => TimeVariant::HoursMinutes,
        })
    }
}

/// Today plus `offset_days` in local time, e.g. `gt_date(1, DateVariant::DayMonth)` → `"21.11."`
pub fn gt_date(offset_days: i64, variant: DateVariant) -> String {
    format_date_offset(Local::now().date_naive(), offset_days, variant)
}

/// `base` plus `offset_days` calendar days in the given pattern
///
/// Offsets beyond the supported calendar range leave the date unchanged.
pub fn format_date_offset(base: NaiveDate, offset_days: i64, variant: DateVariant) -> String {
    let days = Days::new(offset_days.unsigned_abs());
    let shifted = if offset_days >= 0 {
        base.checked_add_days(days)
    } else {
        base.checked_sub_days(days)
    };
    let date = shifted.unwrap_or(base);
    date.format(variant.pattern()).to_string()
}

/// Current local time of day, `HH:MM` or `HH:MM:SS`
pub fn gt_time(variant: TimeVariant) -> String {
    format_time(Local::now().time(), variant)
}

pub fn format_time(time: NaiveTime, variant: TimeVariant) -> String {
    match variant {
        TimeVariant::HoursMinutes => format!("{:02}:{:02}", time.hour(), time.minute()),
        TimeVariant::HoursMinutesSeconds => format!(
            "{:02}:{:02}:{:02}",
            time.hour(),
            time.minute(),
            time.second()
        ),
    }
}

/// Local midnight of the day containing `ts` (or of today), in ms
///
/// A missing or zero timestamp means today.
pub fn start_of_day(ts: Option<i64>) -> i64 {
    start_of_day_in(&Local, ts)
}

/// Midnight of the day containing `ts` (or of today) in the given zone, in ms
///
/// A missing or zero timestamp means today. When midnight does not exist (a DST gap at 00:00) the first valid instant
/// of the day is used. Timestamps outside the calendar range are returned
/// unchanged.
pub fn start_of_day_in<Tz: TimeZone>(tz: &Tz, ts: Option<i64>) -> i64 {
    let ts = present(ts).unwrap_or_else(|| chrono::Utc::now().timestamp_millis());
    local_date(tz, ts)
        .and_then(|date| midnight_of(tz, date))
        .unwrap_or(ts)
}

fn local_date<Tz: TimeZone>(tz: &Tz, ts: i64) -> Option<NaiveDate> {
    tz.timestamp_millis_opt(ts)
        .single()
        .map(|dt| dt.naive_local().date())
}

fn midnight_of<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Option<i64> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    // Gaps are at most a few hours; probe forward in 15 minute steps
    (0..=16).find_map(|step| {
        let naive = midnight + chrono::Duration::minutes(15 * step);
        tz.from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.timestamp_millis())
    })
}

/// Whether two timestamps fall on the same local calendar day
pub fn is_same_day(a: Option<i64>, b: Option<i64>) -> bool {
    is_same_day_in(&Local, a, b)
}

/// Whether two timestamps fall on the same calendar day in the given zone
///
/// Missing or zero timestamps are never on the same day as anything.
pub fn is_same_day_in<Tz: TimeZone>(tz: &Tz, a: Option<i64>, b: Option<i64>) -> bool {
    match (present(a), present(b)) {
        (Some(a), Some(b)) => start_of_day_in(tz, Some(a)) == start_of_day_in(tz, Some(b)),
        _ => false,
    }
}

/// Whole local calendar days from `a` to `b` (negative if `b` is earlier)
pub fn days_between(a: Option<i64>, b: Option<i64>) -> i64 {
    days_between_in(&Local, a, b)
}

/// Whole calendar days from `a` to `b` in the given zone
///
/// Missing or zero timestamps give 0.
pub fn days_between_in<Tz: TimeZone>(tz: &Tz, a: Option<i64>, b: Option<i64>) -> i64 {
    let (Some(a), Some(b)) = (present(a), present(b)) else {
        return 0;
    };
    match (local_date(tz, a), local_date(tz, b)) {
        (Some(a), Some(b)) => b.signed_duration_since(a).num_days(),
        _ => 0,
    }
}

fn present(ts: Option<i64>) -> Option<i64> {
    ts.filter(|t| *t != 0)
}
