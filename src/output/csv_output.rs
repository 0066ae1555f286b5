//! Flat CSV writer

use crate::model::AdRecord;
use crate::output::traits::{OutputFormat, OutputResult, RecordWriter};
use std::io::Write;

/// UTF-8 byte order mark, so spreadsheet tools detect the encoding
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes one flattened row per record under a header row
#[derive(Debug, Default, Clone, Copy)]
pub struct CsvWriter;

impl RecordWriter for CsvWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Csv
    }

    fn write_records(&self, records: &[AdRecord], out: &mut dyn Write) -> OutputResult<()> {
        out.write_all(UTF8_BOM)?;

        let mut writer = csv::Writer::from_writer(out);
        if records.is_empty() {
            writer.write_record(FLAT_HEADER)?;
        }
        for record in records {
            writer.serialize(record.to_flat())?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Header written when there are no rows to derive it from
const FLAT_HEADER: &[&str] = &[
    "id",
    "url",
    "title",
    "scraped_at",
    "nickname",
    "phone",
    "kakao_id",
    "telegram_id",
    "business_name",
    "work_location",
    "views",
    "job_type",
    "salary",
    "deadline",
    "company_name",
    "company_address",
    "thumbnail",
    "image_count",
];
