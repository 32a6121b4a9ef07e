// ── Compiled regex cache ─────────────────────────────────────────────────────

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

pub mod aggregate;
pub mod extract;
pub mod pipeline;
pub mod preprocess;
pub mod recognizer;
pub mod types;

pub use aggregate::{base_with_bonuses, looks_like_receipt, weighted_field_sum};
pub use extract::Extractor;
pub use pipeline::{Disposition, PipelineError, ReceiptPipeline, ScanOutcome};
pub use preprocess::{prepare_for_recognition, PreprocessError};
pub use recognizer::{MockRecognizer, OcrBackend, OcrError, Recognition};
pub use types::{ExtractionRecord, FieldResult, SimpleExtractionRecord};
