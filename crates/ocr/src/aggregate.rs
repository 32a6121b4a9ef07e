//! The two scoring models behind the two product surfaces.
//!
//! [`weighted_field_sum`] backs the full record; [`base_with_bonuses`] backs
//! the simplified coney-logging record. They answer different questions and
//! are kept as separate functions with their own constants.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;

use crate::types::{ExtractionRecord, FieldResult, SimpleExtractionRecord};

re!(re_indicator_word,
    r"(?i)\b(?:total|subtotal|tax|receipt|check|order)\b");
re!(re_indicator_currency,
    r"\$\s*\d[\d,]*\.\d{2}\b");
re!(re_indicator_time,
    r"\b\d{1,2}:\d{2}\b");

// ── Weighted field sum ───────────────────────────────────────────────────────

pub const BRAND_WEIGHT: f32 = 0.30;
pub const QUANTITY_WEIGHT: f32 = 0.30;
pub const DATE_WEIGHT: f32 = 0.20;
pub const TIME_WEIGHT: f32 = 0.10;
pub const TOTAL_WEIGHT: f32 = 0.05;
pub const CHECK_WEIGHT: f32 = 0.05;

/// Combine per-field results into the full record.
///
/// Missing fields contribute zero; the sum is never renormalized over the
/// fields that were found. Brand and quantity confidences are uncapped, so
/// only the final blend is clamped to 1.0.
pub fn weighted_field_sum(
    raw_text: &str,
    brand: FieldResult<String>,
    quantity: FieldResult<u32>,
    date: FieldResult<NaiveDate>,
    time: FieldResult<String>,
    total: FieldResult<Decimal>,
    check_number: FieldResult<String>,
) -> ExtractionRecord {
    let overall_confidence = [
        (brand.confidence, BRAND_WEIGHT),
        (quantity.confidence, QUANTITY_WEIGHT),
        (date.confidence, DATE_WEIGHT),
        (time.confidence, TIME_WEIGHT),
        (total.confidence, TOTAL_WEIGHT),
        (check_number.confidence, CHECK_WEIGHT),
    ]
    .iter()
    .fold(0.0f32, |acc, (conf, weight)| acc + conf * weight)
    .min(1.0);

    ExtractionRecord {
        brand,
        quantity,
        date,
        time,
        total,
        check_number,
        items: vec![],
        overall_confidence,
        raw_text: raw_text.to_string(),
    }
}

// ── Base with bonuses ────────────────────────────────────────────────────────

pub const BASE_CONFIDENCE: f32 = 0.5;
pub const QUANTITY_BONUS: f32 = 0.3;
pub const DATE_BONUS: f32 = 0.2;
pub const RECEIPT_BONUS: f32 = 0.2;

pub const WARN_NOT_RECEIPT: &str = "This doesn't look like a receipt. Please check the photo.";
pub const WARN_NO_QUANTITY: &str = "Couldn't find how many coneys were ordered.";
pub const WARN_NO_DATE: &str = "Couldn't find the receipt date.";

/// Score the simplified record from a flat base plus fixed bonuses.
///
/// Warnings for a missing count or date are emitted whether or not the text
/// looks like a receipt.
pub fn base_with_bonuses(
    coney_count: FieldResult<u32>,
    date: FieldResult<String>,
    plausible_receipt: bool,
) -> SimpleExtractionRecord {
    let mut confidence = BASE_CONFIDENCE;
    let mut warnings = Vec::new();

    if coney_count.is_found() {
        confidence += QUANTITY_BONUS;
    }
    if date.is_found() {
        confidence += DATE_BONUS;
    }
    if plausible_receipt {
        confidence += RECEIPT_BONUS;
    } else {
        warnings.push(WARN_NOT_RECEIPT.to_string());
    }
    if !coney_count.is_found() {
        warnings.push(WARN_NO_QUANTITY.to_string());
    }
    if !date.is_found() {
        warnings.push(WARN_NO_DATE.to_string());
    }

    SimpleExtractionRecord {
        coney_count: coney_count.value,
        date: date.value,
        confidence: confidence.min(1.0),
        is_valid_receipt: plausible_receipt,
        warnings,
    }
}

/// Receipt plausibility: any generic receipt marker anywhere in the text.
pub fn looks_like_receipt(text: &str) -> bool {
    [re_indicator_word(), re_indicator_currency(), re_indicator_time()]
        .iter()
        .any(|re| re.is_match(text))
}
