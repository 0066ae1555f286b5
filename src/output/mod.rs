//! Output module for persisting scraped records
//!
//! This module handles:
//! - Writing records as JSON, JSON Lines or flat CSV
//! - The ledger of URLs collected by earlier runs
//! - End-of-run statistics

mod csv_output;
mod json;
pub mod ledger;
pub mod stats;
mod traits;

pub use csv_output::CsvWriter;
pub use json::{JsonWriter, JsonlWriter};
pub use ledger::CollectedUrls;
pub use stats::{print_summary, RunSummary};
pub use traits::{OutputError, OutputFormat, OutputResult, RecordWriter};

use crate::model::AdRecord;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Returns the writer for a format
pub fn writer_for(format: OutputFormat) -> Box<dyn RecordWriter> {
    match format {
        OutputFormat::Json => Box::new(JsonWriter),
        OutputFormat::Jsonl => Box::new(JsonlWriter),
        OutputFormat::Csv => Box::new(CsvWriter),
    }
}

/// Writes all records to `path`, replacing any existing file
///
/// Parent directories are created as needed.
///
/// # Arguments
///
/// * `records` - Records in dispatch order
/// * `path` - Destination file
/// * `format` - Serialization format
///
/// # Returns
///
/// * `Ok(())` - File written and flushed
/// * `Err(OutputError)` - Directory creation, serialization or write failed
pub fn save_output(records: &[AdRecord], path: &Path, format: OutputFormat) -> OutputResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut out = BufWriter::new(file);
    writer_for(format).write_records(records, &mut out)?;
    out.flush()?;

    tracing::debug!(
        "Wrote {} records to {} as {}",
        records.len(),
        path.display(),
        format
    );
    Ok(())
}
