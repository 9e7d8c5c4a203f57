//! Fixed-column projection of documents into per-sheet export rows.
//!
//! The export path re-derives schema classification with its own signature
//! set; the display path's classification never leaks in (the two sets
//! drift, and both are contractual).

use std::collections::BTreeMap;

use ctos_model::sheets::{
    SectionRow, SheetSchema, NEW_SECTION_A, NEW_SECTION_B, NEW_SECTION_C, NEW_SECTION_D,
    NEW_SUMMARY, NEW_TRADE_REFERENCE, OLD_ACCOUNT_RECORDS, OLD_REPORT_INFO,
};
use ctos_model::{Field, FieldKind, SchemaVariant, EXPORT_SIGNATURES};
use roxmltree::{Document, Node};

use crate::classify::classify;
use crate::walk::sections;
use crate::walk::tref;
use crate::walk::{self, ExtractError};

/// Rows for one document, bucketed per sheet, plus the export-path
/// classification that chose the schema table.
#[derive(Debug)]
pub struct StructuredRows {
    pub variant: SchemaVariant,
    pub sheets: BTreeMap<&'static str, Vec<SectionRow>>,
}

/// Project one sanitized document into fixed-column rows for export.
///
/// `account` fills the leading column of every row. Documents the export
/// classifier does not recognize route through the legacy tables and simply
/// populate fewer columns.
pub fn extract_structured(xml: &str, account: &str) -> Result<StructuredRows, ExtractError> {
    let doc = Document::parse(xml)?;
    let variant = classify(xml, &EXPORT_SIGNATURES);
    let sheets = match variant {
        SchemaVariant::New => project_new(&doc, account),
        SchemaVariant::Old | SchemaVariant::Unknown => project_old(&doc, account),
    };
    Ok(StructuredRows { variant, sheets })
}

fn project_new(doc: &Document, account: &str) -> BTreeMap<&'static str, Vec<SectionRow>> {
    let mut sheets: BTreeMap<&'static str, Vec<SectionRow>> = BTreeMap::new();
    let root = doc.root_element();

    sheets
        .entry(NEW_SUMMARY.name)
        .or_default()
        .push(summary_row(root, &NEW_SUMMARY, account));

    for node in root.descendants().filter(|n| n.is_element()) {
        match node.tag_name().name() {
            "section_a" => section_rows(node, &NEW_SECTION_A, Strategy::Shallow, account, &mut sheets),
            "section_b1" | "section_b2" | "banking" => {
                section_rows(node, &NEW_SECTION_B, Strategy::Shallow, account, &mut sheets)
            }
            "section_c1" => section_rows(node, &NEW_SECTION_C, Strategy::Deep, account, &mut sheets),
            "section_d" => section_rows(node, &NEW_SECTION_D, Strategy::Indexed, account, &mut sheets),
            "section_e" => {
                section_rows(node, &NEW_TRADE_REFERENCE, Strategy::Shallow, account, &mut sheets)
            }
            "tref" | "tref_plus" => enquiry_rows(node, account, &mut sheets),
            _ => {}
        }
    }
    sheets
}

fn project_old(doc: &Document, account: &str) -> BTreeMap<&'static str, Vec<SectionRow>> {
    let mut sheets: BTreeMap<&'static str, Vec<SectionRow>> = BTreeMap::new();
    let root = doc.root_element();

    sheets
        .entry(OLD_REPORT_INFO.name)
        .or_default()
        .push(summary_row(root, &OLD_REPORT_INFO, account));

    let schema = &OLD_ACCOUNT_RECORDS;
    for section in root
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "section")
    {
        let title = section
            .attribute("title")
            .or_else(|| section.attribute("id"))
            .unwrap_or(schema.sentinel);
        let mut record_idx = 0;
        for record in walk::elements(section).filter(|n| n.tag_name().name() == "record") {
            let marker = walk::record_marker(record, record_idx);
            record_idx += 1;

            let mut fields = Vec::new();
            for data in walk::elements(record).filter(|n| n.tag_name().name() == "data") {
                walk::data_fields(data, schema.sentinel, &mut fields);
            }

            let mut row = SectionRow::blank(schema);
            row.set_field(schema, "nu_ptl", account);
            row.set_field(schema, "section_title", title);
            row.set_field(schema, "record_seq", &marker.value);
            copy_values(&fields, schema, &mut row);
            sheets.entry(schema.name).or_default().push(row);
        }
    }
    sheets
}

/// One row per document from the report id, header and summary blocks.
fn summary_row(root: Node, schema: &SheetSchema, account: &str) -> SectionRow {
    let mut fields = Vec::new();
    collect_summary_fields(root, schema.sentinel, &mut fields);

    let mut row = SectionRow::blank(schema);
    row.set_field(schema, "nu_ptl", account);
    copy_values(&fields, schema, &mut row);
    row
}

fn collect_summary_fields(root: Node, sentinel: &str, out: &mut Vec<Field>) {
    for node in root.descendants().filter(|n| n.is_element()) {
        match node.tag_name().name() {
            "report" | "enq_report" => {
                if let Some(id) = node.attribute("id") {
                    out.push(Field::value("report_no", id));
                }
            }
            "header" => {
                let wraps_secondary_report = walk::elements(node)
                    .any(|c| matches!(c.tag_name().name(), "report" | "enq_report"));
                if !wraps_secondary_report {
                    walk::header_fields(node, sentinel, out);
                }
            }
            "summary" | "enq_sum" => walk::summary_fields(node, sentinel, out),
            _ => {}
        }
    }
}

#[derive(Clone, Copy)]
enum Strategy {
    Shallow,
    Deep,
    Indexed,
}

fn section_rows(
    node: Node,
    schema: &SheetSchema,
    strategy: Strategy,
    account: &str,
    sheets: &mut BTreeMap<&'static str, Vec<SectionRow>>,
) {
    let mut record_idx = 0;
    for record in walk::elements(node).filter(|n| n.tag_name().name() == "record") {
        let marker = walk::record_marker(record, record_idx);
        record_idx += 1;

        let mut fields = Vec::new();
        match strategy {
            Strategy::Shallow => sections::shallow_fields(record, schema.sentinel, &mut fields),
            Strategy::Deep => sections::deep_fields(record, schema.sentinel, &mut fields),
            Strategy::Indexed => sections::indexed_fields(record, schema.sentinel, &mut fields),
        }

        let mut row = SectionRow::blank(schema);
        row.set_field(schema, "nu_ptl", account);
        row.set_field(schema, "record_seq", &marker.value);
        copy_values(&fields, schema, &mut row);
        sheets.entry(schema.name).or_default().push(row);
    }
}

/// Trade-reference enquiries: one row per enquiry, numbered in list order.
fn enquiry_rows(
    node: Node,
    account: &str,
    sheets: &mut BTreeMap<&'static str, Vec<SectionRow>>,
) {
    let schema = &NEW_TRADE_REFERENCE;
    for (idx, enquiry) in walk::elements(node)
        .filter(|n| n.tag_name().name() == "enquiry")
        .enumerate()
    {
        let mut fields = Vec::new();
        tref::enquiry_fields(enquiry, schema.sentinel, &mut fields);

        let mut row = SectionRow::blank(schema);
        row.set_field(schema, "nu_ptl", account);
        row.set_field(schema, "record_seq", &(idx + 1).to_string());
        copy_values(&fields, schema, &mut row);
        sheets.entry(schema.name).or_default().push(row);
    }
}

fn copy_values(fields: &[Field], schema: &SheetSchema, row: &mut SectionRow) {
    for field in fields {
        if matches!(field.kind, FieldKind::Value) {
            row.set_field(schema, &field.name, &field.value);
        }
    }
}
