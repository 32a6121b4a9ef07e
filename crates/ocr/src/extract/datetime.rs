use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};

use super::PatternRule;
use crate::types::FieldResult;

re!(re_date_slash,
    r"\b(\d{1,2})/(\d{1,2})/(\d{4}|\d{2})\b");
re!(re_date_iso,
    r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b");
re!(re_date_month_day,
    r"\b(\d{1,2})/(\d{1,2})\b");
re!(re_time,
    r"(?i)\b(\d{1,2}):(\d{2})(?::(\d{2}))?(?:[ \t]*([ap])\.?[ \t]?m\b\.?)?(?:[^\d:]|$)");

const TIME_CONFIDENCE: f32 = 0.7;

/// Calendar-validated, first valid pattern wins.
const DATE_PATTERNS: &[PatternRule<NaiveDate>] = &[
    PatternRule { regex: re_date_slash, parse: valid_slash, confidence: 0.8 },
    PatternRule { regex: re_date_iso, parse: valid_iso, confidence: 0.8 },
];

/// Unvalidated, and also accepts a bare month/day.
const LOOSE_DATE_PATTERNS: &[PatternRule<String>] = &[
    PatternRule { regex: re_date_slash, parse: assemble_slash, confidence: 0.8 },
    PatternRule { regex: re_date_iso, parse: assemble_iso, confidence: 0.8 },
    PatternRule { regex: re_date_month_day, parse: assemble_month_day, confidence: 0.6 },
];

/// Transaction date for the full flow.
///
/// An assembled date that is not a real calendar day (e.g. `13/40/2024`) is
/// discarded and the next pattern is tried.
pub fn extract_date(text: &str) -> FieldResult<NaiveDate> {
    first_match(DATE_PATTERNS, text)
}

/// Transaction date for the simplified flow, as a display string.
///
/// Receipts often omit the year, so `MM/DD` is accepted verbatim
/// (zero-padded) and nothing is calendar-checked: `13/40` comes back as
/// `"13/40"`.
pub fn extract_date_loose(text: &str) -> FieldResult<String> {
    first_match(LOOSE_DATE_PATTERNS, text)
}

/// `HH:MM[:SS][ AM|PM]`, zero-padded, not range-checked.
pub fn extract_time(text: &str) -> FieldResult<String> {
    match re_time().captures(text).and_then(|c| assemble_time(&c)) {
        Some(t) => FieldResult::found(t, TIME_CONFIDENCE),
        None => FieldResult::absent(),
    }
}

fn first_match<T>(rules: &[PatternRule<T>], text: &str) -> FieldResult<T> {
    rules
        .iter()
        .find_map(|rule| rule.apply(text).map(|v| FieldResult::found(v, rule.confidence)))
        .unwrap_or_else(FieldResult::absent)
}

// ── Normalizers ───────────────────────────────────────────────────────────────

fn assemble_slash(c: &Captures<'_>) -> Option<String> {
    let month: u32 = c.get(1)?.as_str().parse().ok()?;
    let day: u32 = c.get(2)?.as_str().parse().ok()?;
    let year = expand_year(c.get(3)?.as_str().parse().ok()?);
    Some(format!("{year:04}-{month:02}-{day:02}"))
}

fn assemble_iso(c: &Captures<'_>) -> Option<String> {
    let year: i32 = c.get(1)?.as_str().parse().ok()?;
    let month: u32 = c.get(2)?.as_str().parse().ok()?;
    let day: u32 = c.get(3)?.as_str().parse().ok()?;
    Some(format!("{year:04}-{month:02}-{day:02}"))
}

fn assemble_month_day(c: &Captures<'_>) -> Option<String> {
    let month: u32 = c.get(1)?.as_str().parse().ok()?;
    let day: u32 = c.get(2)?.as_str().parse().ok()?;
    Some(format!("{month:02}/{day:02}"))
}

fn valid_slash(c: &Captures<'_>) -> Option<NaiveDate> {
    validate(&assemble_slash(c)?)
}

fn valid_iso(c: &Captures<'_>) -> Option<NaiveDate> {
    validate(&assemble_iso(c)?)
}

fn validate(assembled: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(assembled, "%Y-%m-%d").ok()
}

fn expand_year(y: i32) -> i32 {
    if y < 100 { 2000 + y } else { y }
}

fn assemble_time(c: &Captures<'_>) -> Option<String> {
    let hour: u32 = c.get(1)?.as_str().parse().ok()?;
    let minute = c.get(2)?.as_str();
    let mut out = format!("{hour:02}:{minute}");
    if let Some(sec) = c.get(3) {
        out.push(':');
        out.push_str(sec.as_str());
    }
    if let Some(meridiem) = c.get(4) {
        out.push_str(if meridiem.as_str().eq_ignore_ascii_case("a") { " AM" } else { " PM" });
    }
    Some(out)
}
