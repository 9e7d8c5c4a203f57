//! Trade-reference extraction.
//!
//! A trade-reference container holds an enquiry list; each enquiry carries
//! its account number plus relationship / account-status / contact
//! subsections. The flattened output separates consecutive enquiries with a
//! blank spacer row.

use ctos_model::{Field, DISPLAY_SENTINEL};
use roxmltree::Node;

use super::sections::{self, shallow_field, shallow_fields};
use super::{elements, value_field};

pub(crate) fn trade_reference(node: Node, out: &mut Vec<Field>) {
    out.push(Field::section(sections::section_title(node)));
    let mut first = true;
    for enquiry in elements(node).filter(|n| n.tag_name().name() == "enquiry") {
        if !first {
            out.push(Field::spacer());
        }
        first = false;
        enquiry_fields(enquiry, DISPLAY_SENTINEL, out);
    }
}

/// Flatten one enquiry: the account number leads, then each subsection in
/// document order. The account-status subsection contains the aging subtree
/// and expands through the fixed bucket vector.
pub(crate) fn enquiry_fields(enquiry: Node, sentinel: &str, out: &mut Vec<Field>) {
    if let Some(account) = elements(enquiry).find(|n| n.tag_name().name() == "account_no") {
        out.push(value_field("account_no", account, sentinel));
    }
    for child in elements(enquiry) {
        match child.tag_name().name() {
            "account_no" => {}
            "relationship" | "account_status" | "contact" => {
                shallow_fields(child, sentinel, out);
            }
            _ => shallow_field(child, sentinel, out),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctos_model::FieldKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn enquiries_flatten_with_spacer_between_them() {
        let xml = r#"<tref>
            <enquiry>
                <account_no>4.5E+11</account_no>
                <relationship><referee>Supplier A</referee></relationship>
                <account_status><status>active</status><aging><item name="30">10</item></aging></account_status>
                <contact><phone>555</phone></contact>
            </enquiry>
            <enquiry>
                <account_no>99</account_no>
            </enquiry>
        </tref>"#;
        let doc = roxmltree::Document::parse(xml).expect("parse");
        let mut out = Vec::new();
        trade_reference(doc.root_element(), &mut out);

        assert_eq!(out[0].name, "Trade Reference");
        assert!(out[0].is_bold());
        // Account number repaired from scientific notation.
        assert_eq!(out[1].name, "account_no");
        assert_eq!(out[1].value, "450000000000");
        assert_eq!(out[2].name, "referee");
        assert_eq!(out[3].name, "status");
        // Aging expands to the full vector.
        assert_eq!(out[4].name, "age_30");
        assert_eq!(out[4].value, "10");
        assert_eq!(out[10].name, "age_210");
        assert_eq!(out[10].value, "-");
        assert_eq!(out[11].name, "phone");
        // Spacer separates the two enquiries.
        assert_eq!(out[12].kind, FieldKind::Spacer);
        assert_eq!(out[13].name, "account_no");
        assert_eq!(out[13].value, "99");
        assert_eq!(out.len(), 14);
    }
}
