use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::validate::DEFAULT_PARALLEL_THRESHOLD;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlError(#[from] toml::de::Error),
    #[error("Delimiter must be a single ASCII character, got '{0}'")]
    InvalidDelimiter(String),
    #[error("Header row must be 1 or greater")]
    InvalidHeaderRow,
}

/// Per-import knobs. Every field has a default, so an empty file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// 1-based row holding the column titles.
    pub header_row: usize,
    pub delimiter: String,
    /// Number given to the first generated receipt.
    pub first_receipt_number: u64,
    /// Batch size from which rows are validated in parallel; 0 disables.
    pub parallel_threshold: usize,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            header_row: 1,
            delimiter: ",".to_string(),
            first_receipt_number: 1,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl ImportSettings {
    pub fn from_toml(toml_content: &str) -> Result<Self, SettingsError> {
        let settings: ImportSettings = toml::from_str(toml_content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.header_row == 0 {
            return Err(SettingsError::InvalidHeaderRow);
        }
        match self.delimiter.as_bytes() {
            [b] if b.is_ascii() => Ok(()),
            _ if self.delimiter == "\\t" => Ok(()),
            _ => Err(SettingsError::InvalidDelimiter(self.delimiter.clone())),
        }
    }

    /// The delimiter as a byte; `\t` may be written as a literal backslash-t.
    /// Falls back to `,` when the setting was never validated.
    pub fn delimiter_byte(&self) -> u8 {
        if self.delimiter == "\\t" {
            return b'\t';
        }
        match self.delimiter.as_bytes() {
            [b] if b.is_ascii() => *b,
            _ => b',',
        }
    }
}
