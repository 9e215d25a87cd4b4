//! Date display helpers for partial ISO dates (`YYYY-MM`, `YYYY-MM-DD`).
//!
//! Malformed input never errors: it is echoed back unchanged so a typo in the
//! content file shows up verbatim in the document instead of aborting a run.

use chrono::{Datelike, Local};

const SHORT_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const LONG_MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Separator between the two ends of a range.
pub const RANGE_SEPARATOR: char = '–';

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    /// 1-based.
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// The current month on the local clock.
    pub fn now() -> Self {
        let today = Local::now().date_naive();
        Self::new(today.year(), today.month())
    }

    /// Parses the year and month of a partial ISO date; the day is ignored.
    pub fn parse(date: &str) -> Option<Self> {
        let (year, month) = split_year_month(date)?;
        let year: i32 = year.trim().parse().ok()?;
        let month: u32 = month.trim().parse().ok()?;
        (1..=12).contains(&month).then_some(Self::new(year, month))
    }
}

fn split_year_month(date: &str) -> Option<(&str, &str)> {
    let mut parts = date.split('-');
    let year = parts.next().filter(|y| !y.is_empty())?;
    let month = parts.next().filter(|m| !m.is_empty())?;
    Some((year, month))
}

// ────────────────────────────────────────────────────────────────────────────
// Single dates
// ────────────────────────────────────────────────────────────────────────────

/// Formats `date` under `pattern`, relative to the current month.
pub fn format_date(date: Option<&str>, pattern: &str, include_expected: bool) -> String {
    format_date_at(date, pattern, include_expected, YearMonth::now())
}

/// Formats `date` under `pattern` with `today` as the reference month.
///
/// Pattern tokens: `MMMM` (January), `MMM` (Jan), `MM` (01), `YYYY` (2024),
/// `YY` (24).
/// Future months get an `Expected ` prefix when `include_expected` is set.
pub fn format_date_at(
    date: Option<&str>,
    pattern: &str,
    include_expected: bool,
    today: YearMonth,
) -> String {
    let Some(date) = date.filter(|d| !d.is_empty()) else {
        return String::new();
    };
    let Some((year, _)) = split_year_month(date) else {
        return date.to_string();
    };
    let Some(parsed) = YearMonth::parse(date) else {
        return date.to_string();
    };

    let idx = (parsed.month - 1) as usize;
    // Parsing succeeded on the trimmed year, so it is ASCII digits (plus sign).
    let year = year.trim();
    let short_year = year.get(year.len().saturating_sub(2)..).unwrap_or(year);
    let numeric_month = format!("{:02}", parsed.month);

    // Longest tokens first so MMMM is not consumed as MMM + M.
    let mut out = pattern.to_string();
    for (token, value) in [
        ("MMMM", LONG_MONTHS[idx]),
        ("MMM", SHORT_MONTHS[idx]),
        ("MM", numeric_month.as_str()),
        ("YYYY", year),
        ("YY", short_year),
    ] {
        out = out.replacen(token, value, 1);
    }

    if include_expected && parsed > today && !starts_with_expected(&out) {
        out = format!("Expected {out}");
    }
    out
}

fn starts_with_expected(s: &str) -> bool {
    let prefix = "expected";
    s.len() > prefix.len()
        && s.is_char_boundary(prefix.len())
        && s[..prefix.len()].eq_ignore_ascii_case(prefix)
        && s[prefix.len()..].starts_with(char::is_whitespace)
}

// ────────────────────────────────────────────────────────────────────────────
// Ranges
// ────────────────────────────────────────────────────────────────────────────

/// Formats a start/end pair relative to the current month.
pub fn format_date_range(start: Option<&str>, end: Option<&str>, pattern: &str) -> String {
    format_date_range_at(start, end, pattern, YearMonth::now())
}

/// Formats a start/end pair with `today` as the reference month.
///
/// An open-ended range reads `<start>–Present`. Only the end of a closed range
/// may carry the `Expected` prefix, and only when it lies in the future.
pub fn format_date_range_at(
    start: Option<&str>,
    end: Option<&str>,
    pattern: &str,
    today: YearMonth,
) -> String {
    let start = start.filter(|s| !s.is_empty());
    let end = end.filter(|e| !e.is_empty());

    match (start, end) {
        (None, None) => String::new(),
        (Some(s), None) => format!(
            "{}{RANGE_SEPARATOR}Present",
            format_date_at(Some(s), pattern, true, today)
        ),
        (None, Some(e)) => format_date_at(Some(e), pattern, true, today),
        (Some(s), Some(e)) => {
            let end_is_future = YearMonth::parse(e).is_some_and(|ym| ym > today);
            format!(
                "{}{RANGE_SEPARATOR}{}",
                format_date_at(Some(s), pattern, true, today),
                format_date_at(Some(e), pattern, end_is_future, today)
            )
        }
    }
}
