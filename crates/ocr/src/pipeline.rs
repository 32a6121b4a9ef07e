use std::path::Path;
use std::sync::Arc;

use coney_core::{EngineConfig, PipelineSettings, Thresholds};
use serde::Serialize;
use thiserror::Error;

use crate::extract::Extractor;
use crate::preprocess;
use crate::recognizer::{OcrBackend, OcrError, Recognition};
use crate::types::{ExtractionRecord, SimpleExtractionRecord};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Input is {size} bytes, limit is {limit}")]
    InputTooLarge { size: usize, limit: usize },
    #[error("Image preprocessing failed: {0}")]
    Preprocess(#[from] crate::preprocess::PreprocessError),
    #[error("OCR recognition failed: {0}")]
    Ocr(#[from] OcrError),
    #[error("OCR recognition timed out after {0}s")]
    Timeout(u64),
    #[error("OCR task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("Invalid brand catalog: {0}")]
    Catalog(#[from] coney_core::CatalogError),
}

/// What the caller should do with an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    AutoAccept,
    NeedsConfirmation,
    Reject,
}

impl Disposition {
    pub fn for_confidence(confidence: f32, thresholds: &Thresholds) -> Self {
        if confidence >= thresholds.auto_accept {
            Disposition::AutoAccept
        } else if confidence >= thresholds.review {
            Disposition::NeedsConfirmation
        } else {
            Disposition::Reject
        }
    }

    /// Routing for the coney-logging flow. Text without any receipt marker is
    /// never accepted without the user looking at it.
    pub fn for_simple(record: &SimpleExtractionRecord, thresholds: &Thresholds) -> Self {
        match Self::for_confidence(record.confidence(), thresholds) {
            Disposition::AutoAccept if !record.is_valid_receipt() => Disposition::NeedsConfirmation,
            other => other,
        }
    }
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Disposition::AutoAccept => write!(f, "auto_accept"),
            Disposition::NeedsConfirmation => write!(f, "needs_confirmation"),
            Disposition::Reject => write!(f, "reject"),
        }
    }
}

/// The result of a single receipt processing run.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutcome {
    /// Confidence reported by the recognizer, if recognition ran.
    pub recognition_confidence: Option<f32>,
    pub record: ExtractionRecord,
    pub simple: SimpleExtractionRecord,
    pub disposition: Disposition,
}

/// Orchestrates: size check → preprocess → OCR (bounded) → extract → route.
pub struct ReceiptPipeline<R: OcrBackend + 'static> {
    recognizer: Arc<R>,
    extractor: Extractor,
    thresholds: Thresholds,
    settings: PipelineSettings,
}

impl<R: OcrBackend + 'static> ReceiptPipeline<R> {
    pub fn new(recognizer: R, config: &EngineConfig) -> Result<Self, PipelineError> {
        Ok(Self {
            recognizer: Arc::new(recognizer),
            extractor: Extractor::new(config.catalog()?),
            thresholds: config.thresholds,
            settings: config.pipeline.clone(),
        })
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Process a photo on disk.
    pub async fn process_file(&self, path: &Path) -> Result<ScanOutcome, PipelineError> {
        let size = tokio::fs::metadata(path).await?.len() as usize;
        self.check_size(size)?;
        let bytes = tokio::fs::read(path).await?;
        self.process_bytes(&bytes).await
    }

    /// Process raw photo bytes (camera capture or upload).
    pub async fn process_bytes(&self, data: &[u8]) -> Result<ScanOutcome, PipelineError> {
        self.check_size(data.len())?;

        let image_bytes = preprocess::prepare_for_recognition(data)?;
        let recognition = self.recognize(image_bytes).await?;

        let mut outcome = self.process_text(&recognition.text);
        outcome.recognition_confidence = Some(recognition.confidence);
        Ok(outcome)
    }

    /// Run both extraction flows over text that has already been recognized.
    pub fn process_text(&self, text: &str) -> ScanOutcome {
        let record = self.extractor.extract(text);
        let simple = self.extractor.extract_simple(text);
        let disposition = Disposition::for_simple(&simple, &self.thresholds);
        tracing::info!(
            %disposition,
            confidence = simple.confidence(),
            overall_confidence = record.overall_confidence,
            "receipt processed"
        );
        ScanOutcome { recognition_confidence: None, record, simple, disposition }
    }

    fn check_size(&self, size: usize) -> Result<(), PipelineError> {
        let limit = self.settings.max_input_bytes;
        if size > limit {
            tracing::warn!(size, limit, "rejecting oversized receipt image");
            return Err(PipelineError::InputTooLarge { size, limit });
        }
        Ok(())
    }

    /// The recognizer may block, so it runs off the async executor under the
    /// configured time budget.
    async fn recognize(&self, image_bytes: Vec<u8>) -> Result<Recognition, PipelineError> {
        let recognizer = Arc::clone(&self.recognizer);
        let task = tokio::task::spawn_blocking(move || recognizer.recognize(&image_bytes));
        match tokio::time::timeout(self.settings.timeout(), task).await {
            Ok(joined) => Ok(joined??),
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.settings.timeout_secs,
                    "OCR recognition timed out"
                );
                Err(PipelineError::Timeout(self.settings.timeout_secs))
            }
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
