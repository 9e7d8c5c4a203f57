//! Per-account fragment grouping, concatenation, and best-candidate
//! selection.

use std::collections::BTreeMap;

use ctos_model::schema::{PERFECT_ROOTS, REPAIR_ROOT, SYNTHETIC_ROOT};
use ctos_model::{AccountKey, RawFragment, SchemaVariant, DISPLAY_SIGNATURES};

use crate::classify::classify;
use crate::sanitize::sanitize;

/// Deduplicate fragment rows and group them per (uncollapsed) account key.
///
/// When two rows share the same `(account, sequence)` pair, the later row
/// wins outright; bodies are never merged.
pub fn group_fragments(
    rows: impl IntoIterator<Item = RawFragment>,
) -> BTreeMap<AccountKey, BTreeMap<i64, String>> {
    let mut grouped: BTreeMap<AccountKey, BTreeMap<i64, String>> = BTreeMap::new();
    for row in rows {
        grouped
            .entry(row.account)
            .or_default()
            .insert(row.sequence, row.xml);
    }
    grouped
}

/// Concatenate one account's fragments in ascending sequence order as raw
/// text (multi-record bodies are split across rows and must not be re-parsed
/// individually), then sanitize the result.
pub fn combine(fragments: &BTreeMap<i64, String>) -> String {
    let mut text = String::new();
    for xml in fragments.values() {
        text.push_str(xml);
    }
    sanitize(&text)
}

/// Pick the best representative among several combined documents for one
/// collapsed account key.
///
/// Order of preference: perfect candidates (a real report/enquiry root, not
/// just a synthetic wrapper); among those, new-format over old; then the
/// highest opening-tag count as a completeness proxy. Ties keep the
/// first-seen candidate, so the result is deterministic for a given input
/// order but not order-independent. With no perfect candidate at all, the
/// first candidate wins.
pub fn select_best(candidates: &[String]) -> usize {
    let perfect: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, text)| is_perfect(text))
        .map(|(idx, _)| idx)
        .collect();
    if perfect.is_empty() {
        return 0;
    }

    let new_format: Vec<usize> = perfect
        .iter()
        .copied()
        .filter(|idx| classify(&candidates[*idx], &DISPLAY_SIGNATURES) == SchemaVariant::New)
        .collect();
    let pool = if new_format.is_empty() { perfect } else { new_format };

    let mut best = pool[0];
    let mut best_count = open_tag_count(&candidates[best]);
    for idx in pool.into_iter().skip(1) {
        let count = open_tag_count(&candidates[idx]);
        if count > best_count {
            best = idx;
            best_count = count;
        }
    }
    best
}

/// A perfect fragment has a primary report/enquiry root once synthetic
/// wrappers are peeled away.
fn is_perfect(text: &str) -> bool {
    let doc = match roxmltree::Document::parse(text) {
        Ok(doc) => doc,
        Err(_) => return false,
    };
    let mut root = doc.root_element();
    loop {
        let tag = root.tag_name().name();
        if PERFECT_ROOTS.contains(&tag) {
            return true;
        }
        if tag != SYNTHETIC_ROOT && tag != REPAIR_ROOT {
            return false;
        }
        let mut elements = root.children().filter(|n| n.is_element());
        match (elements.next(), elements.next()) {
            (Some(only), None) => root = only,
            _ => return false,
        }
    }
}

/// Density heuristic, not a semantic measure: the candidate with the most
/// opening tags is taken as the most complete.
fn open_tag_count(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut count = 0;
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'<' {
            match bytes.get(i + 1) {
                Some(b'/') | Some(b'!') | Some(b'?') | None => {}
                Some(_) => count += 1,
            }
        }
    }
    count
}
