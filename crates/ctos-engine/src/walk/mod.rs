//! Tag-dispatched flattening of a sanitized document tree.
//!
//! Traversal is depth-first pre-order over element nodes; text and comment
//! nodes only contribute leaf values. Each tag rule decides what to emit,
//! whether to recurse (and under what path context), and whether it consumes
//! its descendants itself. The sanitizer's synthetic wrappers are
//! transparent: traversal descends into their children without emitting
//! anything for the wrapper.

pub(crate) mod age;
pub(crate) mod sections;
pub(crate) mod tref;

use ctos_model::schema::{REPAIR_ROOT, SYNTHETIC_ROOT};
use ctos_model::{Field, DISPLAY_SENTINEL};
use roxmltree::{Document, Node};
use thiserror::Error;

use crate::numeric::renormalize_identifier;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("xml parse error: {0}")]
    Parse(#[from] roxmltree::Error),
}

/// Flatten `xml` into the ordered display field list.
///
/// A document that fails to parse yields a single diagnostic field carrying
/// the error text; this function never panics and never returns an error.
pub fn extract_fields(xml: &str) -> Vec<Field> {
    match try_extract(xml) {
        Ok(fields) => fields,
        Err(err) => vec![Field::error(err.to_string())],
    }
}

/// Like [`extract_fields`], but surfaces the parse failure so batch callers
/// can record it in their error list.
pub fn try_extract(xml: &str) -> Result<Vec<Field>, ExtractError> {
    let doc = Document::parse(xml)?;
    let mut out = Vec::new();
    walk_node(doc.root_element(), "", &mut out);
    Ok(out)
}

fn walk_node(node: Node, path: &str, out: &mut Vec<Field>) {
    let tag = node.tag_name().name();
    if tag == SYNTHETIC_ROOT || tag == REPAIR_ROOT {
        walk_children(node, path, out);
        return;
    }
    match tag {
        "report" | "enq_report" => rule_report(node, path, out),
        "header" => rule_header(node, path, out),
        "summary" | "enq_sum" => summary_fields(node, DISPLAY_SENTINEL, out),
        "section" => rule_section(node, out),
        "record" => rule_record(node, path, out),
        "data" => data_fields(node, DISPLAY_SENTINEL, out),
        "section_a" | "section_b1" | "section_b2" | "section_e" | "banking" => {
            sections::shallow_section(node, out)
        }
        "section_c1" => sections::deep_section(node, out),
        "section_d" => sections::indexed_section(node, out),
        "tref" | "tref_plus" => tref::trade_reference(node, out),
        "history" => sections::history_periods(node, DISPLAY_SENTINEL, out),
        _ => rule_generic(node, path, out),
    }
}

fn walk_children(node: Node, path: &str, out: &mut Vec<Field>) {
    for child in elements(node) {
        walk_node(child, path, out);
    }
}

/// Report container: emit the report id, then descend with the id as the
/// path context. The context is carried for nested grouping even though
/// flattening does not currently render it.
fn rule_report(node: Node, path: &str, out: &mut Vec<Field>) {
    match node.attribute("id") {
        Some(id) => {
            out.push(Field::value("report_no", id));
            walk_children(node, id, out);
        }
        None => walk_children(node, path, out),
    }
}

/// Header block: pure pass-through when it wraps a secondary report element;
/// otherwise each immediate child is a leaf field.
fn rule_header(node: Node, path: &str, out: &mut Vec<Field>) {
    let wraps_secondary_report = elements(node)
        .any(|c| matches!(c.tag_name().name(), "report" | "enq_report"));
    if wraps_secondary_report {
        walk_children(node, path, out);
    } else {
        header_fields(node, DISPLAY_SENTINEL, out);
    }
}

fn rule_section(node: Node, out: &mut Vec<Field>) {
    let title = node
        .attribute("title")
        .or_else(|| node.attribute("id"))
        .unwrap_or(DISPLAY_SENTINEL);
    out.push(Field::section(title));
    walk_children(node, title, out);
}

fn rule_record(node: Node, path: &str, out: &mut Vec<Field>) {
    out.push(Field::record(node.attribute("seq").unwrap_or(DISPLAY_SENTINEL)));
    walk_children(node, path, out);
}

/// Anything without a dedicated rule: recurse through containers, emit
/// leaves as (tag, text). Unknown-schema documents route entirely through
/// this rule and simply produce fewer recognizable fields.
fn rule_generic(node: Node, path: &str, out: &mut Vec<Field>) {
    if has_element_children(node) {
        walk_children(node, path, out);
    } else {
        out.push(value_field(node.tag_name().name(), node, DISPLAY_SENTINEL));
    }
}

/// Header children as leaf fields. Shared with the projector's summary-row
/// collector.
pub(crate) fn header_fields(node: Node, sentinel: &str, out: &mut Vec<Field>) {
    for child in elements(node) {
        out.push(value_field(child.tag_name().name(), child, sentinel));
    }
}

/// Summary block: producers denormalize the name/value list two ways. The
/// variant with an explicit `name` attribute wins whenever both shapes
/// appear in the subtree.
pub(crate) fn summary_fields(node: Node, sentinel: &str, out: &mut Vec<Field>) {
    let named: Vec<Node> = node
        .descendants()
        .filter(|n| n.is_element() && n.attribute("name").is_some())
        .collect();
    if !named.is_empty() {
        for item in named {
            if let Some(name) = item.attribute("name") {
                let value = renormalize_identifier(name, text_or(item, sentinel));
                out.push(Field::value(name, value));
            }
        }
        return;
    }
    for child in elements(node) {
        match elements(child).find(|c| c.tag_name().name() == "name") {
            Some(name_node) => {
                let name = text_or(name_node, sentinel);
                let value = elements(child)
                    .find(|c| c.tag_name().name() == "value")
                    .map(|v| text_or(v, sentinel))
                    .unwrap_or_else(|| sentinel.to_string());
                let value = renormalize_identifier(&name, value);
                out.push(Field::value(name, value));
            }
            None => out.push(value_field(child.tag_name().name(), child, sentinel)),
        }
    }
}

/// Generic leaf-data element of the older layout: the display name prefers
/// the `caption` attribute over `name`; the age field expands into the fixed
/// bucket vector.
pub(crate) fn data_fields(node: Node, sentinel: &str, out: &mut Vec<Field>) {
    let name = data_field_name(node);
    if name.eq_ignore_ascii_case("age") {
        age::expand(node, sentinel, out);
        return;
    }
    out.push(value_field(&name, node, sentinel));
}

pub(crate) fn data_field_name(node: Node) -> String {
    node.attribute("caption")
        .or_else(|| node.attribute("name"))
        .map(str::to_string)
        .unwrap_or_else(|| node.tag_name().name().to_string())
}

pub(crate) fn elements<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|n| n.is_element())
}

pub(crate) fn has_element_children(node: Node) -> bool {
    elements(node).next().is_some()
}

/// Trimmed text content of a leaf, or the sentinel when empty/absent.
pub(crate) fn text_or(node: Node, sentinel: &str) -> String {
    match node.text().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => sentinel.to_string(),
    }
}

/// Leaf emission with the numeric-identifier repair applied where the field
/// name calls for it.
pub(crate) fn value_field(name: &str, node: Node, sentinel: &str) -> Field {
    let value = renormalize_identifier(name, text_or(node, sentinel));
    Field::value(name, value)
}

/// Record marker: the `seq` attribute when present, otherwise the 1-based
/// ordinal within the parent.
pub(crate) fn record_marker(node: Node, index: usize) -> Field {
    match node.attribute("seq") {
        Some(seq) => Field::record(seq),
        None => Field::record((index + 1).to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctos_model::FieldKind;
    use pretty_assertions::assert_eq;

    fn pairs(fields: &[Field]) -> Vec<(&str, &str)> {
        fields.iter().map(|f| (f.name.as_str(), f.value.as_str())).collect()
    }

    #[test]
    fn old_layout_round_trip_emits_markers_then_fields() {
        let xml = r#"<report><section id="A"><record seq="1"><data name="x">hello</data></record></section></report>"#;
        let fields = extract_fields(xml);
        assert_eq!(
            pairs(&fields),
            vec![("A", "-"), ("Record", "1"), ("x", "hello")]
        );
        assert!(fields[0].is_bold());
        assert_eq!(fields[1].kind, FieldKind::Record);
    }

    #[test]
    fn section_title_attribute_wins_over_id() {
        let xml = r#"<report><section id="A" title="Banking Accounts"/></report>"#;
        let fields = extract_fields(xml);
        assert_eq!(pairs(&fields), vec![("Banking Accounts", "-")]);
    }

    #[test]
    fn report_id_is_emitted_before_children() {
        let xml = r#"<report id="R99"><header><name>Jane</name></header></report>"#;
        let fields = extract_fields(xml);
        assert_eq!(
            pairs(&fields),
            vec![("report_no", "R99"), ("name", "Jane")]
        );
    }

    #[test]
    fn header_with_secondary_report_is_pass_through() {
        let xml = r#"<header><enq_report id="E1"><header><name>Jane</name></header></enq_report></header>"#;
        let fields = extract_fields(xml);
        // The outer header emits nothing of its own; the nested report and
        // its header do.
        assert_eq!(
            pairs(&fields),
            vec![("report_no", "E1"), ("name", "Jane")]
        );
    }

    #[test]
    fn summary_prefers_name_attribute_variant() {
        let xml = r#"<summary>
            <field><name>Ignored</name><value>0</value></field>
            <item name="Total Accounts">4</item>
        </summary>"#;
        let fields = extract_fields(xml);
        assert_eq!(pairs(&fields), vec![("Total Accounts", "4")]);
    }

    #[test]
    fn summary_falls_back_to_nested_name_value_children() {
        let xml = r#"<summary><field><name>Total Accounts</name><value>4</value></field></summary>"#;
        let fields = extract_fields(xml);
        assert_eq!(pairs(&fields), vec![("Total Accounts", "4")]);
    }

    #[test]
    fn data_caption_wins_over_name() {
        let xml = r#"<report><section id="A"><record seq="1"><data name="acct" caption="Account No">7</data></record></section></report>"#;
        let fields = extract_fields(xml);
        assert_eq!(fields.last().map(|f| f.name.as_str()), Some("Account No"));
    }

    #[test]
    fn age_data_expands_to_all_seven_buckets() {
        let xml = r#"<report><section id="A"><record seq="1"><data name="age">
            <item name="30">100</item><item name="90">50</item>
        </data></record></section></report>"#;
        let fields = extract_fields(xml);
        let ages: Vec<(&str, &str)> = pairs(&fields)
            .into_iter()
            .filter(|(n, _)| n.starts_with("age_"))
            .collect();
        assert_eq!(
            ages,
            vec![
                ("age_30", "100"),
                ("age_60", "-"),
                ("age_90", "50"),
                ("age_120", "-"),
                ("age_150", "-"),
                ("age_180", "-"),
                ("age_210", "-"),
            ]
        );
    }

    #[test]
    fn account_number_in_scientific_notation_is_renormalized() {
        let xml = r#"<report><section id="A"><record seq="1"><data name="account_no">4.5E+11</data></record></section></report>"#;
        let fields = extract_fields(xml);
        assert_eq!(
            fields.last().map(|f| f.value.as_str()),
            Some("450000000000")
        );
    }

    #[test]
    fn synthetic_wrappers_are_transparent() {
        let xml = r#"<xdoc><xfrag><report><section id="A"/></report></xfrag></xdoc>"#;
        let fields = extract_fields(xml);
        assert_eq!(pairs(&fields), vec![("A", "-")]);
    }

    #[test]
    fn unparseable_document_yields_single_diagnostic_field() {
        let fields = extract_fields("<not <valid");
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].kind, FieldKind::Error);
        assert!(!fields[0].value.is_empty());
    }

    #[test]
    fn escaped_wrapper_text_yields_no_fields() {
        // The sanitizer's escape fallback: nothing matches any rule.
        let fields = extract_fields("<xdoc>some escaped text</xdoc>");
        assert!(fields.is_empty());
    }
}
