use std::sync::OnceLock;

use regex::Regex;

use super::{parse_count, PatternRule};
use crate::types::FieldResult;

/// Added per matching full-mode pattern, and the strict-mode confidence.
const PATTERN_CONFIDENCE: f32 = 0.7;
const FALLBACK_CONFIDENCE: f32 = 0.4;

// Horizontal whitespace only: a count must sit on the same line as its item.
re!(re_canonical,
    r"(?i)\b(\d+)[ \t]*(?:x[ \t]*)?cheese[ \t]+coney\b");
re!(re_canonical_plural,
    r"(?i)\b(\d+)[ \t]*(?:x[ \t]*)?cheese[ \t]+coneys\b");
re!(re_serving,
    r"(?i)\b(\d+)[ \t]*(?:x[ \t]*)?(?:pcs?|pieces?|orders?[ \t]+of|ea)[ \t]+(?:cheese[ \t]+)?con(?:ey|eys|ies)\b");
re!(re_sized,
    r"(?i)\b(\d+)[ \t]*(?:x[ \t]*)?(?:small|sm|regular|reg|large|lg|jumbo)[ \t]+(?:cheese[ \t]+)?con(?:ey|eys|ies)\b");
re!(re_family,
    r"(?i)\b(\d+)[ \t]*(?:x[ \t]*)?(?:coneys?|conies|coney[ \t]*dogs?)\b");

re!(re_strict_leading,
    r"(?i)\b(\d+)[ \t]*(?:x[ \t]*)?cheese[ \t]+coneys?\b");
re!(re_strict_trailing,
    r"(?i)\bcheese[ \t]+coneys?[ \t]*(?:x|qty:?)[ \t]*(\d+)\b");

const FULL_PATTERNS: &[PatternRule<u32>] = &[
    PatternRule { regex: re_canonical, parse: parse_count, confidence: PATTERN_CONFIDENCE },
    PatternRule { regex: re_canonical_plural, parse: parse_count, confidence: PATTERN_CONFIDENCE },
    PatternRule { regex: re_serving, parse: parse_count, confidence: PATTERN_CONFIDENCE },
    PatternRule { regex: re_sized, parse: parse_count, confidence: PATTERN_CONFIDENCE },
];

const FALLBACK: PatternRule<u32> =
    PatternRule { regex: re_family, parse: parse_count, confidence: FALLBACK_CONFIDENCE };

const STRICT_PATTERNS: &[PatternRule<u32>] = &[
    PatternRule { regex: re_strict_leading, parse: parse_count, confidence: PATTERN_CONFIDENCE },
    PatternRule { regex: re_strict_trailing, parse: parse_count, confidence: PATTERN_CONFIDENCE },
];

/// Full-mode coney count.
///
/// Each pattern contributes its first match: quantities are summed and
/// confidence grows by 0.7 per matching pattern, so it can exceed 1.0.
/// Only when nothing matches does the loose item-family fallback run.
pub fn extract_quantity(text: &str) -> FieldResult<u32> {
    let mut total: Option<u32> = None;
    let mut confidence = 0.0f32;
    for rule in FULL_PATTERNS {
        if let Some(n) = rule.apply(text) {
            total = Some(total.unwrap_or(0).saturating_add(n));
            confidence += rule.confidence;
        }
    }

    match total {
        Some(n) => FieldResult::found(n, confidence),
        None => match FALLBACK.apply(text) {
            Some(n) => FieldResult::found(n, FALLBACK.confidence),
            None => FieldResult::absent(),
        },
    }
}

/// Strict-mode coney count for the logging flow: literal "cheese coney"
/// mentions only, first matching pattern wins, no summing.
pub fn extract_quantity_strict(text: &str) -> FieldResult<u32> {
    STRICT_PATTERNS
        .iter()
        .find_map(|rule| rule.apply(text).map(|n| FieldResult::found(n, rule.confidence)))
        .unwrap_or_else(FieldResult::absent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_two_cheese_coney() {
        assert_eq!(extract_quantity_strict("2 Cheese Coney"), FieldResult::found(2, 0.7));
    }

    #[test]
    fn strict_trailing_multiplier() {
        assert_eq!(extract_quantity_strict("CHEESE CONEY x4  $14.76").value, Some(4));
    }

    #[test]
    fn strict_takes_first_pattern_only() {
        // Leading form wins; the trailing count is not added.
        let r = extract_quantity_strict("2 cheese coneys\ncheese coney x3");
        assert_eq!(r, FieldResult::found(2, 0.7));
    }

    #[test]
    fn strict_rejects_loose_mentions() {
        assert_eq!(extract_quantity_strict("3 coneys"), FieldResult::absent());
        assert_eq!(extract_quantity_strict("2 lg coney"), FieldResult::absent());
    }

    #[test]
    fn full_single_pattern() {
        let r = extract_quantity("2 Cheese Coney");
        assert_eq!(r, FieldResult::found(2, 0.7));
    }

    #[test]
    fn full_sums_across_distinct_patterns() {
        let r = extract_quantity("2 cheese coney\n3 cheese coneys\n1 large coney");
        assert_eq!(r.value, Some(6));
        assert!((r.confidence - 2.1).abs() < 1e-5, "confidence was {}", r.confidence);
    }

    #[test]
    fn full_counts_each_pattern_once() {
        // Two lines hit the same canonical pattern; only the first counts.
        let r = extract_quantity("2 cheese coney\n5 cheese coney");
        assert_eq!(r, FieldResult::found(2, 0.7));
    }

    #[test]
    fn full_serving_synonym() {
        assert_eq!(extract_quantity("4 pcs coney").value, Some(4));
        assert_eq!(extract_quantity("2 orders of cheese coneys").value, Some(2));
    }

    #[test]
    fn fallback_reports_lower_confidence() {
        assert_eq!(extract_quantity("5 Coneys"), FieldResult::found(5, 0.4));
        assert_eq!(extract_quantity("1 coney dog"), FieldResult::found(1, 0.4));
    }

    #[test]
    fn nothing_matches() {
        assert_eq!(extract_quantity("Total $5.00"), FieldResult::absent());
        assert_eq!(extract_quantity(""), FieldResult::absent());
        assert_eq!(extract_quantity_strict(""), FieldResult::absent());
    }

    #[test]
    fn count_on_previous_line_is_not_adjacent() {
        let text = "Check 4521\nCheese Coney   $3.69\nTotal $3.69";
        assert_eq!(extract_quantity_strict(text), FieldResult::absent());
        assert_eq!(extract_quantity(text), FieldResult::absent());
        assert_eq!(extract_quantity_strict("Table 12\nCheese Coney $3.69"), FieldResult::absent());
        assert_eq!(extract_quantity_strict("Cheese Coney x\n2"), FieldResult::absent());
        assert_eq!(extract_quantity("7\nConeys"), FieldResult::absent());
    }

    #[test]
    fn tab_separated_count_still_matches() {
        assert_eq!(extract_quantity_strict("2\tCheese  Coney").value, Some(2));
    }

    #[test]
    fn oversized_count_is_ignored() {
        assert_eq!(extract_quantity_strict("99999999999 cheese coney"), FieldResult::absent());
    }
}
