//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ReciboError, Result};

/// Main configuration for the recibo pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReciboConfig {
    /// Receipt field extraction configuration.
    pub extraction: ExtractionConfig,

    /// PDF text rendering configuration.
    pub pdf: PdfConfig,

    /// JSON output configuration.
    pub output: OutputConfig,
}

/// How decimal separators in amounts are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecimalFormat {
    /// Every `,` is a decimal point. `1.234,56` is rejected.
    #[default]
    Legacy,
    /// Thousands separators allowed; the right-most separator is the decimal
    /// point when both `.` and `,` appear.
    Locale,
}

/// Receipt field extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Supplier name expected at the start of a line.
    pub supplier_name: String,

    /// Decimal separator handling for amounts and rates.
    pub decimal_format: DecimalFormat,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            supplier_name: "AGRONORTE S.R.L.".to_string(),
            decimal_format: DecimalFormat::Legacy,
        }
    }
}

/// PDF text rendering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Separator placed between the text of consecutive non-empty pages.
    pub page_separator: String,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            page_separator: "\n".to_string(),
        }
    }
}

/// JSON output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Spaces per indentation level.
    pub indent: usize,

    /// Replace an existing JSON file next to the input.
    pub overwrite: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            indent: 4,
            overwrite: true,
        }
    }
}

impl ReciboConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            ReciboError::Config(format!("{}: {}", path.display(), e))
        })
    }

    /// Load from `path` if given, else from `default_path` when it exists,
    /// else fall back to defaults.
    pub fn load_or_default(path: Option<&Path>, default_path: Option<&Path>) -> Result<Self> {
        match (path, default_path) {
            (Some(path), _) => Self::from_file(path),
            (None, Some(default)) if default.exists() => Self::from_file(default),
            _ => Ok(Self::default()),
        }
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default location of the configuration file under `config_dir`.
    pub fn default_path_in(config_dir: &Path) -> PathBuf {
        config_dir.join("recibo").join("config.json")
    }
}
