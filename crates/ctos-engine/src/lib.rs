//! `ctos-engine` is the XML normalization and extraction core.
//!
//! The pipeline, leaf-first:
//!
//! - [`sanitize`]: best-effort markup repair. Truncates trailing garbage,
//!   strips illegal control characters, then cascades strict parse → lenient
//!   event-level repair → escape-and-wrap. Total and idempotent.
//! - [`combine`]: groups raw fragments per account, concatenates them in
//!   sequence order, and selects the best representative document when a
//!   collapsed account key has several candidates.
//! - [`classify`]: routes a document to the old or new report layout by
//!   signature tags (new-format tags take precedence).
//! - [`walk`]: the tag-dispatched tree walker that flattens a document into
//!   an ordered field/value list for display.
//! - [`project`]: maps documents into fixed-column rows per export sheet.
//! - [`batch`]: the sequential per-account pipeline with progress reporting
//!   and a per-account error list.
//!
//! All functions here are pure over their inputs; there is no ambient state.

pub mod batch;
pub mod classify;
pub mod combine;
pub mod numeric;
pub mod progress;
pub mod project;
pub mod sanitize;
pub mod walk;

pub use batch::{best_document_per_account, display_fields, run_batch, BatchOutput};
pub use classify::classify;
pub use combine::{combine, group_fragments, select_best};
pub use progress::{NullProgress, Progress};
pub use project::{extract_structured, StructuredRows};
pub use sanitize::sanitize;
pub use walk::{extract_fields, try_extract, ExtractError};
