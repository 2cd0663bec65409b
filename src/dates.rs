//! Calendar helpers. Every function works on local calendar days; nothing here
//! converts through UTC, so a due date never shifts across midnight.

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveDateTime};

pub fn today_local() -> NaiveDate {
    Local::now().date_naive()
}

/// Zero-padded `YYYY-MM-DD`.
pub fn format_local_date(date: NaiveDate) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Resolves a backend date literal to the local calendar day it falls on.
///
/// Accepts plain dates (`2025-01-31`), RFC 3339 datetimes with an offset, and naive
/// datetimes. Returns `None` for anything else.
pub fn parse_due_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(raw) {
        return Some(datetime.with_timezone(&Local).date_naive());
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(datetime.date());
    }
    None
}

/// Signed whole days from `today` to the due date.
pub fn day_difference(due: &str, today: NaiveDate) -> Option<i64> {
    parse_due_date(due).map(|date| (date - today).num_days())
}

pub fn is_overdue_on(due: Option<&str>, today: NaiveDate) -> bool {
    due.and_then(parse_due_date)
        .map(|date| date < today)
        .unwrap_or(false)
}

pub fn is_overdue(due: Option<&str>) -> bool {
    is_overdue_on(due, today_local())
}

pub fn tomorrow_from(today: NaiveDate) -> NaiveDate {
    today + Duration::days(1)
}

/// The Monday strictly after `today`; on a Monday this is a full week ahead.
pub fn next_monday_from(today: NaiveDate) -> NaiveDate {
    let weekday = i64::from(today.weekday().num_days_from_sunday());
    let distance = match (8 - weekday) % 7 {
        0 => 7,
        days => days,
    };
    today + Duration::days(distance)
}

pub fn tomorrow() -> String {
    format_local_date(tomorrow_from(today_local()))
}

pub fn next_monday() -> String {
    format_local_date(next_monday_from(today_local()))
}

/// Human date such as `5 January`, with the year appended when it differs from `today`'s.
pub fn format_visual_date(date: NaiveDate, today: NaiveDate) -> String {
    let month = date.format("%B");
    if date.year() != today.year() {
        format!("{} {} {}", date.day(), month, date.year())
    } else {
        format!("{} {}", date.day(), month)
    }
}
