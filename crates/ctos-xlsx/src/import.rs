//! CSV input-table import.
//!
//! The table needs two columns: the account identifier and the raw XML body.
//! An optional row-sequence column orders fragments within one account and
//! defaults to a constant when absent. Header matching is case-insensitive
//! after trimming.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use ctos_model::{RawFragment, DEFAULT_SEQUENCE};
use thiserror::Error;

pub const ACCOUNT_COLUMN: &str = "NU_PTL";
pub const XML_COLUMN: &str = "XML";
pub const SEQUENCE_COLUMN: &str = "ROW_SEQ";

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv parse error: {0}")]
    Csv(#[from] csv::Error),
    /// Fatal: surfaced before any row is processed.
    #[error("input table is missing required column {0:?}")]
    MissingColumn(&'static str),
}

pub fn read_fragments_from_path(path: impl AsRef<Path>) -> Result<Vec<RawFragment>, ImportError> {
    read_fragments(File::open(path)?)
}

/// Read fragment rows from a CSV stream with a header row.
///
/// Rows with a blank account identifier cannot be grouped and are skipped;
/// a missing XML cell imports as the empty string (the sanitizer turns that
/// into an empty synthetic-root document). Non-numeric sequence cells fall
/// back to the default constant.
pub fn read_fragments<R: Read>(reader: R) -> Result<Vec<RawFragment>, ImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        // Accept rows with varying column counts; upstream exports are messy.
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let account_idx =
        find_column(&headers, ACCOUNT_COLUMN).ok_or(ImportError::MissingColumn(ACCOUNT_COLUMN))?;
    let xml_idx = find_column(&headers, XML_COLUMN).ok_or(ImportError::MissingColumn(XML_COLUMN))?;
    let sequence_idx = find_column(&headers, SEQUENCE_COLUMN);

    let mut fragments = Vec::new();
    for record in csv_reader.records() {
        let record = record?;
        let account = record.get(account_idx).unwrap_or("").trim();
        if account.is_empty() {
            continue;
        }
        let xml = record.get(xml_idx).unwrap_or("");
        let sequence = sequence_idx
            .and_then(|idx| record.get(idx))
            .map(parse_sequence)
            .unwrap_or(DEFAULT_SEQUENCE);
        fragments.push(RawFragment::new(account, sequence, xml));
    }
    Ok(fragments)
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().to_ascii_uppercase() == name)
}

fn parse_sequence(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(DEFAULT_SEQUENCE)
}
