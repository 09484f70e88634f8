//! Robust event-date parsing.
//!
//! Dates arrive in whichever shape the reporting era produced. Parsing tries
//! the known patterns in a fixed order and only then a set of general
//! fallback formats; an unparseable string is a missing date, never an error.

use chrono::NaiveDate;

/// Fallback formats tried after the ordered patterns, for strays like
/// timestamped exports or spelled-out months.
const FALLBACK_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d-%b-%Y",
    "%d%b%Y",
];

/// Parse an event date, trying in order: YYYYMMDD, YYYY-MM-DD, MM/DD/YYYY,
/// MM-DD-YYYY, YYYY/MM/DD, then the general fallback formats.
pub fn parse_event_date(raw: &str) -> Option<NaiveDate> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Some(date) = parse_compact_ymd(value) {
        return Some(date);
    }
    if let Some(date) = parse_separated(value, '-', DateOrder::YearFirst) {
        return Some(date);
    }
    if let Some(date) = parse_separated(value, '/', DateOrder::MonthFirst) {
        return Some(date);
    }
    if let Some(date) = parse_separated(value, '-', DateOrder::MonthFirst) {
        return Some(date);
    }
    if let Some(date) = parse_separated(value, '/', DateOrder::YearFirst) {
        return Some(date);
    }

    for format in FALLBACK_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
        if let Ok(datetime) = chrono::NaiveDateTime::parse_from_str(value, format) {
            return Some(datetime.date());
        }
    }

    None
}

/// `YYYYMMDD`: exactly eight ASCII digits.
fn parse_compact_ymd(value: &str) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year: i32 = value[0..4].parse().ok()?;
    let month: u32 = value[4..6].parse().ok()?;
    let day: u32 = value[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[derive(Clone, Copy)]
enum DateOrder {
    /// `YYYY?MM?DD`
    YearFirst,
    /// `MM?DD?YYYY`
    MonthFirst,
}

fn parse_separated(value: &str, separator: char, order: DateOrder) -> Option<NaiveDate> {
    let mut parts = value.split(separator);
    let first = parts.next()?;
    let second = parts.next()?;
    let third = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    let (year_part, month_part, day_part) = match order {
        DateOrder::YearFirst => (first, second, third),
        DateOrder::MonthFirst => (third, first, second),
    };
    if year_part.len() != 4 || month_part.len() != 2 || day_part.len() != 2 {
        return None;
    }
    let year: i32 = year_part.parse().ok()?;
    let month: u32 = month_part.parse().ok()?;
    let day: u32 = day_part.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
