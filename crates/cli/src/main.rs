use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use coney_core::EngineConfig;
use coney_ocr::{Disposition, Extractor};

#[derive(Parser)]
#[command(name = "coney")]
#[command(about = "Pull coney counts and receipt details out of OCR text")]
#[command(version)]
struct Cli {
    /// Engine configuration (TOML)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract fields from already-recognized receipt text
    Extract {
        /// Text file to read, or `-` for stdin
        #[arg(value_name = "FILE", default_value = "-")]
        input: String,

        /// Use the simplified coney-logging flow
        #[arg(long)]
        simple: bool,
    },
    /// Recognize a receipt photo and extract it (needs the `tesseract` feature)
    Scan {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
    },
    /// Print the active brand catalog
    Brands,
}

/// A record together with the routing decision for it.
#[derive(Serialize)]
struct Routed<'a, T: Serialize> {
    #[serde(flatten)]
    record: &'a T,
    disposition: Disposition,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays machine-readable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => EngineConfig::default(),
    };
    tracing::debug!(
        custom_brands = config.brands.len(),
        auto_accept = config.thresholds.auto_accept,
        review = config.thresholds.review,
        "configuration loaded"
    );

    match cli.command {
        Commands::Extract { input, simple } => {
            let text = read_input(&input)?;
            let extractor = Extractor::new(config.catalog()?);
            let json = if simple {
                let record = extractor.extract_simple(&text);
                let disposition = Disposition::for_simple(&record, &config.thresholds);
                serde_json::to_string_pretty(&Routed { record: &record, disposition })?
            } else {
                let record = extractor.extract(&text);
                let disposition =
                    Disposition::for_confidence(record.overall_confidence, &config.thresholds);
                serde_json::to_string_pretty(&Routed { record: &record, disposition })?
            };
            println!("{json}");
        }
        Commands::Scan { image } => {
            let outcome = scan(&image, &config).await?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        Commands::Brands => {
            let catalog = config.catalog()?;
            println!("{}", serde_json::to_string_pretty(catalog.entries())?);
        }
    }

    Ok(())
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("reading OCR text from stdin")?;
        Ok(text)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("reading OCR text from {input}"))
    }
}

#[cfg(feature = "tesseract")]
async fn scan(image: &Path, config: &EngineConfig) -> Result<coney_ocr::ScanOutcome> {
    use coney_ocr::recognizer::tesseract_backend::TesseractRecognizer;

    let pipeline = coney_ocr::ReceiptPipeline::new(TesseractRecognizer::new(None, "eng"), config)?;
    tracing::info!("Processing receipt: {}", image.display());
    pipeline
        .process_file(image)
        .await
        .with_context(|| format!("processing {}", image.display()))
}

#[cfg(not(feature = "tesseract"))]
async fn scan(_image: &Path, _config: &EngineConfig) -> Result<coney_ocr::ScanOutcome> {
    Err(coney_ocr::OcrError::NotAvailable.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn extract_defaults_to_stdin() {
        let cli = Cli::try_parse_from(["coney", "extract"]).unwrap();
        match cli.command {
            Commands::Extract { input, simple } => {
                assert_eq!(input, "-");
                assert!(!simple);
            }
            _ => panic!("expected extract"),
        }
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["coney", "brands", "--config", "coney.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("coney.toml")));
    }

    #[test]
    fn routed_output_flattens_record() {
        let record = Extractor::default().extract_simple("2 cheese coney total $5.00");
        let routed = Routed { record: &record, disposition: Disposition::Reject };
        let json = serde_json::to_value(routed).unwrap();
        assert_eq!(json["coney_count"], 2);
        assert_eq!(json["disposition"], "reject");
    }

    #[test]
    fn read_input_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ocr.txt");
        std::fs::write(&path, "Skyline Chili").unwrap();
        assert_eq!(read_input(path.to_str().unwrap()).unwrap(), "Skyline Chili");
        assert!(read_input(dir.path().join("missing.txt").to_str().unwrap()).is_err());
    }
}
