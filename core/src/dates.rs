//! Date and time utilities
//!
//! Every date the store keeps is a `YYYY-MM-DD` string and every time of
//! day is a 24-hour `HH:MM` string. These helpers validate, format and do
//! arithmetic on them. None of them panic or return errors: invalid input
//! yields `None`, an empty string or zero.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use uuid::Uuid;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Generate an opaque id: creation millis plus a random hex suffix.
///
/// Unique within one device's data, not globally.
pub fn generate_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().timestamp_millis(), &suffix[..12])
}

/// Today's date in the local timezone
pub fn today() -> String {
    today_at(Local::now())
}

/// The local calendar date of `now` as `YYYY-MM-DD`
pub fn today_at<Tz: TimeZone>(now: DateTime<Tz>) -> String {
    now.date_naive().format("%Y-%m-%d").to_string()
}

/// Parse a strict `YYYY-MM-DD` string denoting a real calendar date
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }

    let all_digits = bytes
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != 4 && *i != 7)
        .all(|(_, b)| b.is_ascii_digit());
    if !all_digits {
        return None;
    }

    let year: i32 = s[0..4].parse().ok()?;
    let month: u32 = s[5..7].parse().ok()?;
    let day: u32 = s[8..10].parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)
}

pub fn is_valid_date(s: &str) -> bool {
    parse_date(s).is_some()
}

/// Long-form date, e.g. "February 14, 2024". Empty for invalid input.
pub fn format_display(s: &str) -> String {
    parse_date(s)
        .map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_default()
}

/// Month and year, e.g. "February 2025"
pub fn format_month_year(s: &str) -> Option<String> {
    parse_date(s).map(|d| format!("{} {}", month_name(d.month()), d.year()))
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        _ => "December",
    }
}

/// Whole days elapsed since local midnight of `from_iso`
pub fn days_since(from_iso: &str) -> u64 {
    days_since_at(from_iso, Local::now())
}

/// Whole days between local midnight of `from_iso` and `now`.
///
/// Computed from the absolute time delta, so a span crossing a daylight
/// saving change can come out one day short. Invalid or future dates
/// yield 0.
pub fn days_since_at(from_iso: &str, now: DateTime<Local>) -> u64 {
    let Some(date) = parse_date(from_iso) else {
        return 0;
    };
    let Some(start) = date
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(Local).earliest())
    else {
        return 0;
    };

    let elapsed = now.timestamp_millis() - start.timestamp_millis();
    if elapsed <= 0 {
        return 0;
    }
    (elapsed / MILLIS_PER_DAY) as u64
}

/// Parse a strict 24-hour `HH:MM` time
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let bytes = s.as_bytes();
    if bytes.len() != 5 || bytes[2] != b':' {
        return None;
    }
    if !bytes[..2].iter().chain(&bytes[3..]).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let hour: u32 = s[0..2].parse().ok()?;
    let minute: u32 = s[3..5].parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Render `HH:MM` as a 12-hour clock time, e.g. "2:05 PM".
///
/// Out-of-range parts are clamped; unreadable parts count as zero and an
/// empty string reads as noon.
pub fn format_time_12h(hhmm: &str) -> String {
    let hhmm = if hhmm.trim().is_empty() { "12:00" } else { hhmm };
    let mut parts = hhmm.splitn(2, ':');
    let hour = clamp_part(parts.next(), 23);
    let minute = clamp_part(parts.next(), 59);

    let suffix = if hour >= 12 { "PM" } else { "AM" };
    let hour12 = (hour + 11) % 12 + 1;
    format!("{}:{:02} {}", hour12, minute, suffix)
}

fn clamp_part(part: Option<&str>, max: i64) -> i64 {
    part.and_then(|p| p.trim().parse::<i64>().ok())
        .unwrap_or(0)
        .clamp(0, max)
}

/// Time preselected for a new plan: the next whole hour, capped at 23:00
pub fn default_plan_time(now: NaiveTime) -> String {
    let hour = (now.hour() + 1).min(23);
    format!("{:02}:00", hour)
}

/// Wall-clock start of a plan. An empty time reads as noon.
pub fn combine_date_time(date_iso: &str, time_hhmm: &str) -> Option<NaiveDateTime> {
    let date = parse_date(date_iso)?;
    let time = if time_hhmm.trim().is_empty() {
        NaiveTime::from_hms_opt(12, 0, 0)?
    } else {
        parse_time(time_hhmm)?
    };
    Some(date.and_time(time))
}
