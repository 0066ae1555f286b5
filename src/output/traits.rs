//! Output writer trait and formats
//!
//! This module defines the trait interface for record writers and the
//! formats the scraper can emit.

use crate::model::AdRecord;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Unknown output format '{0}' (expected json, jsonl or csv)")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Serialization format of the output file
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed array of nested records
    #[default]
    Json,

    /// One nested record per line
    Jsonl,

    /// Flattened rows with a header, UTF-8 with BOM
    Csv,
}

impl OutputFormat {
    /// File extension conventionally used for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Jsonl => "jsonl",
            Self::Csv => "csv",
        }
    }

    pub fn as_str(&self) -> &'static str {
        self.extension()
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = OutputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "jsonl" => Ok(Self::Jsonl),
            "csv" => Ok(Self::Csv),
            other => Err(OutputError::Format(other.to_string())),
        }
    }
}

/// Trait for record writers
///
/// A writer serializes a complete slice of records to a byte sink. Writers
/// are stateless so the same one can be reused for every checkpoint.
pub trait RecordWriter {
    /// The format this writer produces
    fn format(&self) -> OutputFormat;

    /// Writes every record to `out`
    ///
    /// # Arguments
    ///
    /// * `records` - Records in dispatch order
    /// * `out` - Destination sink
    fn write_records(&self, records: &[AdRecord], out: &mut dyn Write) -> OutputResult<()>;
}
