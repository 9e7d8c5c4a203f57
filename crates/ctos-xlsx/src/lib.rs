//! File-format edges for CTOS report extraction: reading the fragment table
//! from CSV and writing the per-section workbooks as XLSX.

mod import;
mod path;
mod writer;

pub use import::{
    read_fragments, read_fragments_from_path, ImportError, ACCOUNT_COLUMN, SEQUENCE_COLUMN,
    XML_COLUMN,
};
pub use path::timestamped_workbook_path;
pub use writer::{save_workbook, write_workbook, WorkbookWriteError};
