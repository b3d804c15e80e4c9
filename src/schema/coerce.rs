//! Locale-permissive cell coercion.
//!
//! Source cells arrive as strings with Indonesian formatting: comma
//! decimal separators, trailing `%`, month names, long-form dates like
//! "17 Desember 2025". Each parser returns `None` for clearly
//! non-coercible input so the caller can drop the row instead of
//! aborting the load.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

static MONTHS: Lazy<HashMap<&'static str, u32>> = Lazy::new(|| {
    HashMap::from([
        ("januari", 1),
        ("februari", 2),
        ("maret", 3),
        ("april", 4),
        ("mei", 5),
        ("juni", 6),
        ("juli", 7),
        ("agustus", 8),
        ("september", 9),
        ("oktober", 10),
        ("november", 11),
        ("desember", 12),
        // English variants show up in service-sourced tables.
        ("january", 1),
        ("february", 2),
        ("march", 3),
        ("may", 5),
        ("june", 6),
        ("july", 7),
        ("august", 8),
        ("october", 10),
        ("december", 12),
    ])
});

static FILENAME_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(19\d{2}|20\d{2})").expect("year pattern is valid"));

/// Parse a number, accepting `3.2`, `3,2`, `"4,75 %"`. Returns `None`
/// for empty or non-numeric cells.
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .replace('%', "")
        .replace(' ', "")
        .replace(',', ".");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Parse a year cell. Excel exports often carry `2024.0`; fractional
/// values truncate the way the upstream pipeline always has.
pub fn parse_year(raw: &str) -> Option<i32> {
    let value = parse_number(raw)?;
    if !value.is_finite() {
        return None;
    }
    Some(value as i32)
}

/// Parse a month cell: a number in 1–12 or a month name.
pub fn parse_month(raw: &str) -> Option<u32> {
    if let Some(value) = parse_number(raw) {
        let month = value as u32;
        return (1..=12).contains(&month).then_some(month);
    }
    month_from_name(raw)
}

pub fn month_from_name(raw: &str) -> Option<u32> {
    MONTHS.get(raw.trim().to_lowercase().as_str()).copied()
}

/// Parse a date cell. Accepts ISO and slashed forms, datetime strings,
/// and the Indonesian long form "17 Desember 2025".
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    for format in ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, format) {
            return Some(date);
        }
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(s, format) {
            return Some(datetime.date());
        }
    }

    // "17 Desember 2025"
    let parts: Vec<&str> = s.split_whitespace().collect();
    if parts.len() == 3 {
        let day = parts[0].parse().ok()?;
        let month = month_from_name(parts[1])?;
        let year = parts[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    None
}

/// Parse a periode string like "Desember 2025" into (month, year).
pub fn parse_periode(raw: &str) -> Option<(u32, i32)> {
    let parts: Vec<&str> = raw.trim().split_whitespace().collect();
    if parts.len() < 2 {
        return None;
    }
    let month = month_from_name(parts[0])?;
    let year = parts[parts.len() - 1].parse().ok()?;
    Some((month, year))
}

/// Last plausible year in a filename, e.g. `Inflasi_Tahunan_2024.csv`.
pub fn year_from_filename(name: &str) -> Option<i32> {
    FILENAME_YEAR
        .find_iter(name)
        .last()
        .and_then(|m| m.as_str().parse().ok())
}
