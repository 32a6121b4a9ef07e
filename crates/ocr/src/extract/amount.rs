use std::str::FromStr;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use rust_decimal::Decimal;

use super::PatternRule;
use crate::types::FieldResult;

re!(re_total_label,
    r"(?i)\btotal\b(?:\s*(?:due|amt|amount))?[\s:.\-]*\$?\s*(\d[\d,]*\.\d{2})\b");
re!(re_currency,
    r"\$\s*(\d[\d,]*\.\d{2})\b");

const LABELED_TOTAL: PatternRule<Decimal> =
    PatternRule { regex: re_total_label, parse: parse_amount, confidence: 0.9 };

/// Any line item could be the largest amount, hence the low score.
const LARGEST_AMOUNT_CONFIDENCE: f32 = 0.5;

/// Grand total: a "total"-labeled amount, otherwise the largest `$` amount
/// on the page.
pub fn extract_total(text: &str) -> FieldResult<Decimal> {
    if let Some(amount) = LABELED_TOTAL.apply(text) {
        return FieldResult::found(amount, LABELED_TOTAL.confidence);
    }
    re_currency()
        .captures_iter(text)
        .filter_map(|c| parse_amount(&c))
        .max()
        .map_or_else(FieldResult::absent, |amount| {
            FieldResult::found(amount, LARGEST_AMOUNT_CONFIDENCE)
        })
}

fn parse_amount(c: &Captures<'_>) -> Option<Decimal> {
    let clean = c.get(1)?.as_str().replace(',', "");
    Decimal::from_str(&clean).ok()
}
