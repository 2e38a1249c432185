//! CSV export of the visible table view

use super::{visible_records, SortKey, TableState};
use crate::error::{Error, Result};
use crate::evidence::EvidenceRecord;
use std::io;

pub const CSV_FILENAME: &str = "evidence_at_a_glance.csv";

/// UTF-8 byte order mark, so spreadsheet apps pick the right encoding.
pub const BOM: &str = "\u{feff}";

pub fn headers() -> [&'static str; 4] {
    SortKey::ALL.map(SortKey::label)
}

fn writer() -> ::csv::Writer<Vec<u8>> {
    ::csv::WriterBuilder::new()
        .quote_style(::csv::QuoteStyle::Necessary)
        .terminator(::csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new())
}

fn finish(wtr: ::csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = wtr.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

fn fields(record: &EvidenceRecord) -> [&str; 4] {
    SortKey::ALL.map(|k| k.field(record))
}

/// Header row plus one row per record, in the given order.
pub fn to_csv(records: &[&EvidenceRecord]) -> Result<String> {
    let mut wtr = writer();
    wtr.write_record(headers())?;
    for record in records {
        wtr.write_record(fields(record))?;
    }
    finish(wtr)
}

/// A single encoded row without its terminator. The page embeds these so
/// the browser can assemble an export of whatever rows are on screen.
pub fn row_line(record: &EvidenceRecord) -> Result<String> {
    let mut wtr = writer();
    wtr.write_record(fields(record))?;
    let mut line = finish(wtr)?;
    if line.ends_with('\n') {
        line.pop();
    }
    Ok(line)
}

pub fn header_line() -> Result<String> {
    let mut wtr = writer();
    wtr.write_record(headers())?;
    let mut line = finish(wtr)?;
    if line.ends_with('\n') {
        line.pop();
    }
    Ok(line)
}

/// Download body: BOM followed by the CSV text.
pub fn with_bom(text: &str) -> Vec<u8> {
    let mut body = Vec::with_capacity(BOM.len() + text.len());
    body.extend_from_slice(BOM.as_bytes());
    body.extend_from_slice(text.as_bytes());
    body
}

#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: &'static str,
    pub rows: usize,
    pub body: Vec<u8>,
}

impl CsvExport {
    /// Export exactly what the table shows for `state`: filtered, then sorted.
    pub fn from_view(records: &[EvidenceRecord], state: &TableState) -> Result<Self> {
        let visible = visible_records(records, state);
        let text = to_csv(&visible)?;
        tracing::debug!(
            rows = visible.len(),
            sort = %state.sort_by,
            dir = state.sort_dir.as_str(),
            "built csv export"
        );
        Ok(Self {
            filename: CSV_FILENAME,
            rows: visible.len(),
            body: with_bom(&text),
        })
    }

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.filename)
    }
}
