pub mod catalog;
pub mod config;

pub use catalog::{BrandCatalog, BrandEntry, CatalogError, DEFAULT_BRANDS};
pub use config::{ConfigError, EngineConfig, PipelineSettings, Thresholds};
