use std::sync::OnceLock;

use regex::{Captures, Regex};

use super::PatternRule;
use crate::types::FieldResult;

re!(re_check,
    r"(?i)\bcheck\b[ \t]*(?:#|no\.?|num(?:ber)?)?[ \t]*:?[ \t]*(\d+)");
re!(re_order,
    r"(?i)\border\b[ \t]*(?:#|no\.?|num(?:ber)?)?[ \t]*:?[ \t]*(\d+)");
re!(re_receipt,
    r"(?i)\breceipt\b[ \t]*(?:#|no\.?|num(?:ber)?)?[ \t]*:?[ \t]*(\d+)");
re!(re_hash,
    r"#[ \t]*(\d+)");

const CHECK_PATTERNS: &[PatternRule<String>] = &[
    PatternRule { regex: re_check, parse: digits, confidence: 0.8 },
    PatternRule { regex: re_order, parse: digits, confidence: 0.8 },
    PatternRule { regex: re_receipt, parse: digits, confidence: 0.8 },
    PatternRule { regex: re_hash, parse: digits, confidence: 0.8 },
];

/// Check / order number as printed. Earlier labels take precedence over
/// later ones regardless of where they appear in the text.
pub fn extract_check_number(text: &str) -> FieldResult<String> {
    CHECK_PATTERNS
        .iter()
        .find_map(|rule| rule.apply(text).map(|v| FieldResult::found(v, rule.confidence)))
        .unwrap_or_else(FieldResult::absent)
}

fn digits(c: &Captures<'_>) -> Option<String> {
    Some(c.get(1)?.as_str().to_string())
}
