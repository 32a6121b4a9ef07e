use coney_core::BrandCatalog;
use regex::{Captures, Regex};

use crate::aggregate;
use crate::types::{ExtractionRecord, SimpleExtractionRecord};

mod amount;
mod brand;
mod check;
mod datetime;
mod quantity;

pub use amount::extract_total;
pub use brand::{extract_brand, ALIAS_WEIGHT, KEYWORD_WEIGHT};
pub use check::extract_check_number;
pub use datetime::{extract_date, extract_date_loose, extract_time};
pub use quantity::{extract_quantity, extract_quantity_strict};

/// One row of an extractor's pattern table.
///
/// Each extractor owns its table and decides whether rows are evaluated
/// first-match-wins or accumulated.
pub(crate) struct PatternRule<T> {
    pub regex: fn() -> &'static Regex,
    pub parse: fn(&Captures<'_>) -> Option<T>,
    pub confidence: f32,
}

impl<T> PatternRule<T> {
    /// Parse the first match of this rule's pattern, if any.
    pub fn apply(&self, text: &str) -> Option<T> {
        let caps = (self.regex)().captures(text)?;
        (self.parse)(&caps)
    }
}

pub(crate) fn parse_count(c: &Captures<'_>) -> Option<u32> {
    c.get(1)?.as_str().parse().ok()
}

// ── Public extraction API ─────────────────────────────────────────────────────

/// Runs the field extractors over recognized receipt text.
///
/// Holds only the immutable brand catalog; every call is independent.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    catalog: BrandCatalog,
}

impl Extractor {
    pub fn new(catalog: BrandCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &BrandCatalog {
        &self.catalog
    }

    /// Full flow: every field, scored by weighted field sum.
    pub fn extract(&self, ocr_text: &str) -> ExtractionRecord {
        let record = aggregate::weighted_field_sum(
            ocr_text,
            extract_brand(ocr_text, &self.catalog),
            extract_quantity(ocr_text),
            extract_date(ocr_text),
            extract_time(ocr_text),
            extract_total(ocr_text),
            extract_check_number(ocr_text),
        );
        tracing::debug!(
            brand = record.brand.value.as_deref(),
            quantity = record.quantity.value,
            overall_confidence = record.overall_confidence,
            "full extraction"
        );
        record
    }

    /// Simplified flow: strict coney count and loose date, scored by base
    /// plus bonuses.
    pub fn extract_simple(&self, ocr_text: &str) -> SimpleExtractionRecord {
        let record = aggregate::base_with_bonuses(
            extract_quantity_strict(ocr_text),
            extract_date_loose(ocr_text),
            aggregate::looks_like_receipt(ocr_text),
        );
        tracing::debug!(
            coney_count = record.coney_count(),
            confidence = record.confidence(),
            is_valid_receipt = record.is_valid_receipt(),
            warnings = record.warnings().len(),
            "simple extraction"
        );
        record
    }
}
