//! Schema-generation detection.

use ctos_model::schema::{OLD_DATA_TAG, OLD_RECORD_TAG, OLD_SECTION_TAG};
use ctos_model::{SchemaVariant, SignatureSet};

/// Decide which report layout `xml` belongs to.
///
/// New-format signature tags take precedence: transitional documents carry
/// legacy wrapper tags alongside new content and must still route as new.
/// Unparseable documents and documents with no signature tags are `Unknown`;
/// this function never errors.
pub fn classify(xml: &str, signatures: &SignatureSet) -> SchemaVariant {
    let doc = match roxmltree::Document::parse(xml) {
        Ok(doc) => doc,
        Err(_) => return SchemaVariant::Unknown,
    };

    let mut saw_section = false;
    let mut saw_record_or_data = false;
    for node in doc.descendants().filter(|n| n.is_element()) {
        let tag = node.tag_name().name();
        if signatures.contains(tag) {
            return SchemaVariant::New;
        }
        match tag {
            t if t == OLD_SECTION_TAG => saw_section = true,
            t if t == OLD_RECORD_TAG || t == OLD_DATA_TAG => saw_record_or_data = true,
            _ => {}
        }
    }

    if saw_section && saw_record_or_data {
        SchemaVariant::Old
    } else {
        SchemaVariant::Unknown
    }
}
