//! # Loose Date Parsing
//!
//! Normalizes the many ways news sites write dates into `YYYY-MM-DD`, rejecting
//! values that parse but cannot be a real publication date (epoch defaults,
//! far-future placeholders).

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// Dates before this year are treated as placeholders.
pub const EARLIEST_YEAR: i32 = 1995;

static MONTH_DAY_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b([a-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b")
        .expect("month-day-year regex")
});
static DAY_MONTH_YEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+([a-z]+)\.?,?\s+(\d{4})\b")
        .expect("day-month-year regex")
});
static YEAR_MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4})[-/](\d{1,2})[-/](\d{1,2})\b").expect("year-month-day regex")
});
static SLASHED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("slashed date regex"));

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Returns `true` if `text` parses as a date whose year lies between 1995 and
/// the current year, inclusive.
pub fn is_valid_plausible_date(text: &str) -> bool {
    parse_direct(text).is_some_and(is_plausible)
}

/// Parses loosely formatted date text into `YYYY-MM-DD`.
///
/// Tries, in order: machine-readable timestamps, `Month DD, YYYY`, `DD Month YYYY`,
/// `YYYY-MM-DD` / `YYYY/MM/DD`, and `NN/NN/YYYY` (day first when the first
/// number exceeds 12). Returns `None` when nothing matches or the result is not
/// plausible; callers treat that as "no date found".
pub fn parse_loose_date(text: &str) -> Option<String> {
    loose_date(text)
        .filter(|date| is_plausible(*date))
        .map(|date| date.format("%Y-%m-%d").to_string())
}

fn loose_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(date) = parse_direct(text).filter(|date| is_plausible(*date)) {
        return Some(date);
    }

    if let Some(caps) = MONTH_DAY_YEAR.captures(text) {
        let month = month_number(&caps[1]);
        if let Some(date) = ymd(&caps[3], month, &caps[2]) {
            return Some(date);
        }
    }

    if let Some(caps) = DAY_MONTH_YEAR.captures(text) {
        let month = month_number(&caps[2]);
        if let Some(date) = ymd(&caps[3], month, &caps[1]) {
            return Some(date);
        }
    }

    if let Some(caps) = YEAR_MONTH_DAY.captures(text) {
        let month: u32 = caps[2].parse().ok()?;
        return ymd(&caps[1], month, &caps[3]);
    }

    if let Some(caps) = SLASHED.captures(text) {
        let first: u32 = caps[1].parse().ok()?;
        let second: u32 = caps[2].parse().ok()?;
        let (month, day) = if first > 12 {
            (second, first)
        } else {
            (first, second)
        };
        return ymd(&caps[3], month, &day.to_string());
    }

    None
}

/// Parses the machine-readable forms found in `datetime` attributes and meta tags.
fn parse_direct(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.date());
        }
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

fn is_plausible(date: NaiveDate) -> bool {
    (EARLIEST_YEAR..=Utc::now().year()).contains(&date.year())
}

/// Looks a month up by full name or three-letter abbreviation.
///
/// Unknown names map to January rather than failing.
fn month_number(name: &str) -> u32 {
    let name = name.to_lowercase();
    MONTHS
        .iter()
        .position(|month| *month == name || (name.len() == 3 && month.starts_with(&name)))
        .map_or(1, |index| index as u32 + 1)
}

fn ymd(year: &str, month: u32, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month, day.parse().ok()?)
}
