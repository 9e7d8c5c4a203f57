//! Flattening strategies for the per-letter sections of the newer layout.
//!
//! Three reusable shapes cover every section: one-level flattening (most
//! sections), arbitrary-depth flattening (the directorship section), and
//! seq-indexed sub-record flattening (the litigation section's other-party
//! lists).

use ctos_model::{Field, DISPLAY_SENTINEL};
use roxmltree::Node;

use super::{age, elements, has_element_children, record_marker, value_field};

/// Display title for a new-format section element: an explicit `title`
/// attribute when present, otherwise the canonical name for the tag.
pub(crate) fn section_title(node: Node) -> String {
    if let Some(title) = node.attribute("title") {
        return title.to_string();
    }
    match node.tag_name().name() {
        "section_a" => "Section A",
        "section_b1" => "Section B1",
        "section_b2" => "Section B2",
        "section_c1" => "Section C1",
        "section_d" => "Section D",
        "section_e" => "Section E",
        "banking" => "Banking",
        "tref" => "Trade Reference",
        "tref_plus" => "Trade Reference Plus",
        other => other,
    }
    .to_string()
}

/// Section whose records flatten one level deep.
pub(crate) fn shallow_section(node: Node, out: &mut Vec<Field>) {
    out.push(Field::section(section_title(node)));
    let mut record_idx = 0;
    for child in elements(node) {
        if child.tag_name().name() == "record" {
            out.push(record_marker(child, record_idx));
            record_idx += 1;
            shallow_fields(child, DISPLAY_SENTINEL, out);
        } else {
            // Some producers put fields directly under the section element.
            shallow_field(child, DISPLAY_SENTINEL, out);
        }
    }
}

/// Directorship-like section: flattens to arbitrary depth.
pub(crate) fn deep_section(node: Node, out: &mut Vec<Field>) {
    out.push(Field::section(section_title(node)));
    let mut record_idx = 0;
    for child in elements(node) {
        if child.tag_name().name() == "record" {
            out.push(record_marker(child, record_idx));
            record_idx += 1;
            deep_fields(child, DISPLAY_SENTINEL, out);
        } else {
            deep_field(child, "", DISPLAY_SENTINEL, out);
        }
    }
}

/// Litigation-like section: other-party sub-records are indexed.
pub(crate) fn indexed_section(node: Node, out: &mut Vec<Field>) {
    out.push(Field::section(section_title(node)));
    let mut record_idx = 0;
    for child in elements(node) {
        if child.tag_name().name() == "record" {
            out.push(record_marker(child, record_idx));
            record_idx += 1;
            indexed_fields(child, DISPLAY_SENTINEL, out);
        } else {
            shallow_field(child, DISPLAY_SENTINEL, out);
        }
    }
}

/// One-level flattening of every field under `container`.
pub(crate) fn shallow_fields(container: Node, sentinel: &str, out: &mut Vec<Field>) {
    for field in elements(container) {
        shallow_field(field, sentinel, out);
    }
}

pub(crate) fn shallow_field(field: Node, sentinel: &str, out: &mut Vec<Field>) {
    let tag = field.tag_name().name();
    if tag.eq_ignore_ascii_case("age") || tag.eq_ignore_ascii_case("aging") {
        age::expand(field, sentinel, out);
        return;
    }
    if tag == "history" {
        history_periods(field, sentinel, out);
        return;
    }
    if has_element_children(field) {
        // One level only: nested groups flatten as parent_child; anything
        // deeper contributes just its text.
        for sub in elements(field) {
            let name = format!("{}_{}", tag, sub.tag_name().name());
            out.push(value_field(&name, sub, sentinel));
        }
    } else {
        out.push(value_field(tag, field, sentinel));
    }
}

/// Arbitrary-depth flattening with `_`-joined path names.
pub(crate) fn deep_fields(container: Node, sentinel: &str, out: &mut Vec<Field>) {
    for field in elements(container) {
        deep_field(field, "", sentinel, out);
    }
}

fn deep_field(field: Node, prefix: &str, sentinel: &str, out: &mut Vec<Field>) {
    let tag = field.tag_name().name();
    let name = if prefix.is_empty() {
        tag.to_string()
    } else {
        format!("{prefix}_{tag}")
    };
    if has_element_children(field) {
        for sub in elements(field) {
            deep_field(sub, &name, sentinel, out);
        }
    } else {
        out.push(value_field(&name, field, sentinel));
    }
}

/// Litigation record fields: `other_party` sub-records flatten with both the
/// parent field name and their own sequence number as prefix; everything
/// else flattens one level.
pub(crate) fn indexed_fields(record: Node, sentinel: &str, out: &mut Vec<Field>) {
    let mut party_idx = 0;
    for field in elements(record) {
        if field.tag_name().name() != "other_party" {
            shallow_field(field, sentinel, out);
            continue;
        }
        party_idx += 1;
        let seq = field
            .attribute("seq")
            .map(str::to_string)
            .unwrap_or_else(|| party_idx.to_string());
        if has_element_children(field) {
            for sub in elements(field) {
                let name = format!("other_party_{}_{}", seq, sub.tag_name().name());
                out.push(value_field(&name, sub, sentinel));
            }
        } else {
            out.push(value_field(&format!("other_party_{seq}"), field, sentinel));
        }
    }
}

/// Payment-history nesting: one field per period, keyed by its month when
/// the attribute is present.
pub(crate) fn history_periods(node: Node, sentinel: &str, out: &mut Vec<Field>) {
    for (idx, period) in elements(node).enumerate() {
        let name = match period.attribute("month") {
            Some(month) => format!("history_{month}"),
            None => format!("history_{}", idx + 1),
        };
        out.push(value_field(&name, period, sentinel));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fields_of(xml: &str, f: fn(Node, &mut Vec<Field>)) -> Vec<(String, String)> {
        let doc = roxmltree::Document::parse(xml).expect("parse");
        let mut out = Vec::new();
        f(doc.root_element(), &mut out);
        out.into_iter().map(|fld| (fld.name, fld.value)).collect()
    }

    #[test]
    fn shallow_section_flattens_one_level_with_parent_prefix() {
        let out = fields_of(
            r#"<section_b1><record seq="1">
                <lender>Bank A</lender>
                <action><date>2024-01-02</date><kind>restructure</kind></action>
            </record></section_b1>"#,
            shallow_section,
        );
        assert_eq!(
            out,
            vec![
                ("Section B1".to_string(), "-".to_string()),
                ("Record".to_string(), "1".to_string()),
                ("lender".to_string(), "Bank A".to_string()),
                ("action_date".to_string(), "2024-01-02".to_string()),
                ("action_kind".to_string(), "restructure".to_string()),
            ]
        );
    }

    #[test]
    fn deep_section_flattens_to_arbitrary_depth() {
        let out = fields_of(
            r#"<section_c1><record>
                <company><address><line1>1 Main St</line1></address></company>
            </record></section_c1>"#,
            deep_section,
        );
        assert_eq!(
            out,
            vec![
                ("Section C1".to_string(), "-".to_string()),
                ("Record".to_string(), "1".to_string()),
                ("company_address_line1".to_string(), "1 Main St".to_string()),
            ]
        );
    }

    #[test]
    fn indexed_section_prefixes_other_parties_with_seq() {
        let out = fields_of(
            r#"<section_d><record seq="3">
                <case_no>S-1</case_no>
                <other_party seq="1"><name>A</name></other_party>
                <other_party seq="2"><name>B</name><ic_no>77</ic_no></other_party>
            </record></section_d>"#,
            indexed_section,
        );
        assert_eq!(
            out,
            vec![
                ("Section D".to_string(), "-".to_string()),
                ("Record".to_string(), "3".to_string()),
                ("case_no".to_string(), "S-1".to_string()),
                ("other_party_1_name".to_string(), "A".to_string()),
                ("other_party_2_name".to_string(), "B".to_string()),
                ("other_party_2_ic_no".to_string(), "77".to_string()),
            ]
        );
    }

    #[test]
    fn other_party_without_seq_uses_running_index() {
        let out = fields_of(
            r#"<section_d><record>
                <other_party><name>A</name></other_party>
                <other_party><name>B</name></other_party>
            </record></section_d>"#,
            indexed_section,
        );
        assert!(out.contains(&("other_party_1_name".to_string(), "A".to_string())));
        assert!(out.contains(&("other_party_2_name".to_string(), "B".to_string())));
    }

    #[test]
    fn record_without_seq_gets_ordinal_marker() {
        let out = fields_of(
            r#"<section_a><record><name>x</name></record><record><name>y</name></record></section_a>"#,
            shallow_section,
        );
        let records: Vec<&(String, String)> =
            out.iter().filter(|(n, _)| n == "Record").collect();
        assert_eq!(records, vec![&("Record".to_string(), "1".to_string()),
                                 &("Record".to_string(), "2".to_string())]);
    }

    #[test]
    fn aging_subtree_inside_record_expands_in_place() {
        let out = fields_of(
            r#"<section_b1><record seq="1"><aging><item name="30">5</item></aging></record></section_b1>"#,
            shallow_section,
        );
        assert_eq!(out.len(), 2 + 7);
        assert_eq!(out[2], ("age_30".to_string(), "5".to_string()));
        assert_eq!(out[3], ("age_60".to_string(), "-".to_string()));
    }

    #[test]
    fn history_periods_key_by_month() {
        let out = fields_of(
            r#"<section_b2><record seq="1"><history>
                <period month="2024-01">0</period>
                <period>1</period>
            </history></record></section_b2>"#,
            shallow_section,
        );
        assert!(out.contains(&("history_2024-01".to_string(), "0".to_string())));
        assert!(out.contains(&("history_2".to_string(), "1".to_string())));
    }
}
