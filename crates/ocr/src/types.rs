use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single extracted value with an associated confidence score.
///
/// An absent value always carries confidence 0. Confidence is *not* clamped:
/// brand and quantity scores are cumulative and may exceed 1.0.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldResult<T> {
    pub value: Option<T>,
    pub confidence: f32,
}

impl<T> FieldResult<T> {
    pub fn found(value: T, confidence: f32) -> Self {
        Self { value: Some(value), confidence }
    }

    pub fn absent() -> Self {
        Self { value: None, confidence: 0.0 }
    }

    pub fn is_found(&self) -> bool {
        self.value.is_some()
    }
}

impl<T> Default for FieldResult<T> {
    fn default() -> Self {
        Self::absent()
    }
}

/// Output of the full extraction flow.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionRecord {
    pub brand: FieldResult<String>,
    pub quantity: FieldResult<u32>,
    pub date: FieldResult<NaiveDate>,
    /// `HH:MM`, `HH:MM:SS`, optionally followed by ` AM` / ` PM`.
    pub time: FieldResult<String>,
    pub total: FieldResult<Decimal>,
    pub check_number: FieldResult<String>,
    /// Reserved for line-item extraction; always empty.
    pub items: Vec<String>,
    pub overall_confidence: f32,
    pub raw_text: String,
}

/// Output of the simplified flow that backs coney logging.
///
/// `is_valid_receipt` and `warnings` are derived by the simplified scorer;
/// there is no public way to set them independently.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SimpleExtractionRecord {
    pub(crate) coney_count: Option<u32>,
    pub(crate) date: Option<String>,
    pub(crate) confidence: f32,
    pub(crate) is_valid_receipt: bool,
    pub(crate) warnings: Vec<String>,
}

impl SimpleExtractionRecord {
    pub fn coney_count(&self) -> Option<u32> {
        self.coney_count
    }

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn is_valid_receipt(&self) -> bool {
        self.is_valid_receipt
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_pairs_with_zero_confidence() {
        let f: FieldResult<u32> = FieldResult::absent();
        assert_eq!(f.value, None);
        assert_eq!(f.confidence, 0.0);
        assert!(!f.is_found());
        assert_eq!(FieldResult::<String>::default(), FieldResult::absent());
    }

    #[test]
    fn found_keeps_confidence_above_one() {
        let f = FieldResult::found("Skyline Chili", 1.8);
        assert_eq!(f.confidence, 1.8);
        assert!(f.is_found());
    }

    #[test]
    fn extraction_record_serializes_date_as_iso() {
        let record = ExtractionRecord {
            brand: FieldResult::absent(),
            quantity: FieldResult::absent(),
            date: FieldResult::found(NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(), 0.8),
            time: FieldResult::absent(),
            total: FieldResult::absent(),
            check_number: FieldResult::absent(),
            items: vec![],
            overall_confidence: 0.16,
            raw_text: "3/14/24".into(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["date"]["value"], "2024-03-14");
        assert!(json["brand"]["value"].is_null());
    }
}
