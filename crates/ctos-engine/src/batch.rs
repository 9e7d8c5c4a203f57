//! Sequential per-account batch pipeline.
//!
//! Accounts are processed one at a time in sorted key order; extraction and
//! combination are pure functions over immutable inputs, so the only state
//! accumulated here is the output row buffers and the run report. One bad
//! account never aborts a batch.

use std::collections::BTreeMap;

use ctos_model::{AccountKey, BatchReport, Field, RawFragment, SchemaVariant, SectionRow};

use crate::combine::{combine, group_fragments, select_best};
use crate::progress::Progress;
use crate::project::extract_structured;
use crate::walk::extract_fields;

/// Result of one batch run: per-sheet rows for both workbook generations
/// plus the run report.
#[derive(Debug, Default)]
pub struct BatchOutput {
    pub report: BatchReport,
    pub new_sheets: BTreeMap<&'static str, Vec<SectionRow>>,
    pub old_sheets: BTreeMap<&'static str, Vec<SectionRow>>,
}

/// Combine every account's fragments and keep one best document per
/// collapsed account key.
///
/// Candidates for a collapsed key are considered in sorted raw-key order, so
/// selection is deterministic for a given input table.
pub fn best_document_per_account(rows: Vec<RawFragment>) -> BTreeMap<AccountKey, String> {
    let grouped = group_fragments(rows);
    let mut candidates: BTreeMap<AccountKey, Vec<String>> = BTreeMap::new();
    for (key, fragments) in &grouped {
        candidates
            .entry(key.collapse())
            .or_default()
            .push(combine(fragments));
    }
    candidates
        .into_iter()
        .map(|(key, mut docs)| {
            let best = select_best(&docs);
            (key, docs.swap_remove(best))
        })
        .collect()
}

/// Run the full export pipeline over an input table's fragment rows.
pub fn run_batch(rows: Vec<RawFragment>, progress: &mut dyn Progress) -> BatchOutput {
    let docs = best_document_per_account(rows);
    let total = docs.len();
    progress.begin(total);

    let mut out = BatchOutput::default();
    for (idx, (account, xml)) in docs.into_iter().enumerate() {
        match extract_structured(&xml, account.as_str()) {
            Ok(structured) => {
                let target = match structured.variant {
                    SchemaVariant::New => &mut out.new_sheets,
                    SchemaVariant::Old | SchemaVariant::Unknown => &mut out.old_sheets,
                };
                for (sheet, rows) in structured.sheets {
                    target.entry(sheet).or_default().extend(rows);
                }
            }
            Err(err) => out.report.record_error(&account, err.to_string()),
        }
        out.report.accounts_processed += 1;
        progress.account_done(idx + 1, total);
    }
    progress.finish();
    out
}

/// Display path: the flattened field list for one account, or `None` when
/// the table has no fragments for it. The query key collapses the same way
/// grouping does.
pub fn display_fields(rows: Vec<RawFragment>, account: &str) -> Option<Vec<Field>> {
    let wanted = AccountKey::new(account).collapse();
    let docs = best_document_per_account(rows);
    docs.get(&wanted).map(|xml| extract_fields(xml))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgress;
    use ctos_model::sheets::{NEW_SECTION_B, OLD_ACCOUNT_RECORDS};
    use pretty_assertions::assert_eq;

    fn frag(account: &str, seq: i64, xml: &str) -> RawFragment {
        RawFragment::new(account, seq, xml)
    }

    #[test]
    fn suffixed_keys_collapse_to_one_account_and_best_doc_wins() {
        // Two raw keys collapse to "ACC9"; the new-format candidate must win.
        let rows = vec![
            frag(
                "ACC9_1",
                1,
                r#"<report><section id="A"><record seq="1"><data name="x">old</data></record></section></report>"#,
            ),
            frag(
                "ACC9_2",
                1,
                r#"<report><section_b1><record seq="1"><lender>Bank</lender></record></section_b1></report>"#,
            ),
        ];
        let docs = best_document_per_account(rows);
        assert_eq!(docs.len(), 1);
        let doc = &docs[&AccountKey::new("ACC9")];
        assert!(doc.contains("section_b1"));
    }

    #[test]
    fn batch_buckets_rows_by_export_classification() {
        let rows = vec![
            frag(
                "NEW1",
                1,
                r#"<report><section_b1><record seq="1"><lender>Bank</lender></record></section_b1></report>"#,
            ),
            frag(
                "OLD1",
                1,
                r#"<report><section id="A"><record seq="1"><data name="x">v</data></record></section></report>"#,
            ),
        ];
        let out = run_batch(rows, &mut NullProgress);
        assert_eq!(out.report.accounts_processed, 2);
        assert!(out.report.errors.is_empty());
        assert_eq!(out.new_sheets[NEW_SECTION_B.name].len(), 1);
        assert_eq!(out.old_sheets[OLD_ACCOUNT_RECORDS.name].len(), 1);
    }

    #[test]
    fn split_fragments_reassemble_through_the_pipeline() {
        let rows = vec![
            frag("ACC1", 2, "</report>"),
            frag(
                "ACC1",
                1,
                r#"<report><section id="A"><record seq="1"><data name="x">hello</data></record></section>"#,
            ),
        ];
        let fields = display_fields(rows, "ACC1").expect("account present");
        let pairs: Vec<(&str, &str)> = fields
            .iter()
            .map(|f| (f.name.as_str(), f.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("A", "-"), ("Record", "1"), ("x", "hello")]
        );
    }

    #[test]
    fn missing_account_returns_none() {
        assert!(display_fields(Vec::new(), "NOPE").is_none());
    }

    #[test]
    fn accounts_emit_in_sorted_key_order() {
        let rows = vec![
            frag("B", 1, "<report/>"),
            frag("A", 1, "<report/>"),
        ];
        let docs = best_document_per_account(rows);
        let keys: Vec<&str> = docs.keys().map(AccountKey::as_str).collect();
        assert_eq!(keys, vec!["A", "B"]);
    }
}
