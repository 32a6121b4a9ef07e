use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::catalog::{BrandCatalog, BrandEntry, CatalogError};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid threshold: {0}")]
    Threshold(String),
    #[error("Invalid pipeline setting: {0}")]
    Pipeline(String),
    #[error("Invalid brand catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Confidence cut-offs the calling workflow uses to route an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// At or above: accept without asking the user.
    pub auto_accept: f32,
    /// At or above (and below `auto_accept`): ask the user to confirm.
    /// Below: reject.
    pub review: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self { auto_accept: 0.85, review: 0.40 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// File-size ceiling enforced before recognition runs.
    pub max_input_bytes: usize,
    /// Budget for the recognition call.
    pub timeout_secs: u64,
}

impl PipelineSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self { max_input_bytes: 10 * 1024 * 1024, timeout_secs: 30 }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub thresholds: Thresholds,
    pub pipeline: PipelineSettings,
    /// Replaces the built-in catalog when non-empty.
    pub brands: Vec<BrandEntry>,
}

impl EngineConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let Thresholds { auto_accept, review } = self.thresholds;
        for (name, value) in [("auto_accept", auto_accept), ("review", review)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Threshold(format!(
                    "{name} must be within 0.0..=1.0, got {value}"
                )));
            }
        }
        if review > auto_accept {
            return Err(ConfigError::Threshold(format!(
                "review ({review}) must not exceed auto_accept ({auto_accept})"
            )));
        }
        if self.pipeline.max_input_bytes == 0 {
            return Err(ConfigError::Pipeline("max_input_bytes must be positive".into()));
        }
        if self.pipeline.timeout_secs == 0 {
            return Err(ConfigError::Pipeline("timeout_secs must be positive".into()));
        }
        self.catalog()?;
        Ok(())
    }

    /// The catalog extraction should run against.
    pub fn catalog(&self) -> Result<BrandCatalog, CatalogError> {
        if self.brands.is_empty() {
            Ok(BrandCatalog::builtin())
        } else {
            BrandCatalog::new(self.brands.clone())
        }
    }
}
