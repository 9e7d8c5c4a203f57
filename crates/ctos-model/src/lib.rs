//! `ctos-model` defines the core data structures for CTOS report extraction.
//!
//! The crate is intentionally self-contained so it can be reused by:
//! - the extraction engine (sanitize/combine/classify/walk/project)
//! - the CSV import and XLSX export layers
//! - the CLI boundary via `serde` (JSON-safe run summaries)

mod account;
mod record;
mod report;
pub mod schema;
pub mod sheets;

pub use account::{AccountKey, RawFragment, DEFAULT_SEQUENCE};
pub use record::{Field, FieldKind, DISPLAY_SENTINEL};
pub use report::{AccountError, BatchReport};
pub use schema::{
    ParseSchemaVariantError, SchemaVariant, SignatureSet, AGE_BUCKETS, DISPLAY_SIGNATURES,
    EXPORT_SIGNATURES, NUMERIC_ID_FIELDS, PERFECT_ROOTS, REPAIR_ROOT, REPORT_CLOSE,
    SYNTHETIC_ROOT,
};
pub use sheets::{Column, SectionRow, SheetSchema, NEW_SHEETS, OLD_SHEETS};
