// Utility helpers for coercing raw cells and formatting report values.
//
// Meter exports are loose about numbers (decimal commas, unit suffixes) and
// dates (text with a trailing time), so this module keeps that handling in
// one place and the pipeline stages only see typed values.
use chrono::NaiveDate;
use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use regex::Regex;

/// Report month names, indexed by month number minus one.
pub const MONTHS: [&str; 12] = [
    "Янв", "Фев", "Мар", "Апр", "Май", "Июн", "Июл", "Авг", "Сен", "Окт", "Ноя", "Дек",
];

static DATE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2})\.(\d{2})\.(\d{4})").expect("valid date regex"));

static DATE_STRICT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{2}\.\d{2}\.\d{4}(?:\s+\d{1,2}:\d{2}(?::\d{2})?)?$").expect("valid date regex")
});

static NON_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\d.\-]").expect("valid unit regex"));

/// Parse a numeric cell the way meter exports write them.
///
/// - Trims whitespace and returns `None` for empty input.
/// - Replaces a decimal comma with a decimal point.
/// - With `strip_units`, drops everything that is not a digit, point or sign
///   (so `230,5 В` becomes `230.5`).
pub fn parse_f64_safe(s: Option<&str>, strip_units: bool) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    let s = s.replace(',', ".");
    let s = if strip_units {
        NON_NUMERIC.replace_all(&s, "").into_owned()
    } else {
        s
    };
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// True when the text is a bare `DD.MM.YYYY` date, optionally followed by a time.
pub fn is_strict_date(s: &str) -> bool {
    DATE_STRICT.is_match(s.trim())
}

/// Month number (1-12) of a timestamp starting with `DD.MM.YYYY`.
///
/// The date has to exist on the calendar; `31.02.2025` yields `None`.
pub fn parse_month(s: &str) -> Option<u32> {
    let caps = DATE_PREFIX.captures(s.trim())?;
    let day: u32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)?;
    Some(month)
}

/// Report name of a month number; out-of-range numbers give `"?"`.
pub fn month_name(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|i| MONTHS.get(i as usize))
        .copied()
        .unwrap_or("?")
}

/// Single month name, or `first-last` when the range spans several months.
pub fn month_range(first: u32, last: u32) -> String {
    if first == last {
        month_name(first).to_string()
    } else {
        format!("{}-{}", month_name(first), month_name(last))
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for counts in console messages
    // (e.g. `12,408 rows read`).
    n.to_formatted_string(&Locale::en)
}
