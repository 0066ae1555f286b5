//! JSON and JSON Lines writers

use crate::model::AdRecord;
use crate::output::traits::{OutputFormat, OutputResult, RecordWriter};
use std::io::Write;

/// Writes a pretty-printed JSON array of nested records
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonWriter;

impl RecordWriter for JsonWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Json
    }

    fn write_records(&self, records: &[AdRecord], out: &mut dyn Write) -> OutputResult<()> {
        serde_json::to_writer_pretty(&mut *out, records)?;
        out.write_all(b"\n")?;
        Ok(())
    }
}

/// Writes one compact JSON object per line
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonlWriter;

impl RecordWriter for JsonlWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Jsonl
    }

    fn write_records(&self, records: &[AdRecord], out: &mut dyn Write) -> OutputResult<()> {
        for record in records {
            serde_json::to_writer(&mut *out, record)?;
            out.write_all(b"\n")?;
        }
        Ok(())
    }
}
