//! Multi-sheet XLSX workbook writer.
//!
//! Hand-written SpreadsheetML with inline strings only: one worksheet per
//! declared sheet schema, a bold header row, and a single placeholder row
//! for sheets that extracted nothing (a sheet is never entirely empty). The
//! workbook is built fully in memory; callers persist the bytes in one step
//! so no partial file is ever left behind.

use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use std::path::Path;

use ctos_model::sheets::{SectionRow, SheetSchema};
use thiserror::Error;
use zip::write::FileOptions;
use zip::ZipWriter;

#[derive(Debug, Error)]
pub enum WorkbookWriteError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Serialize one workbook: a worksheet per schema in `sheets`, filled from
/// `rows_by_sheet` (keyed by sheet name).
pub fn write_workbook(
    sheets: &[SheetSchema],
    rows_by_sheet: &BTreeMap<&'static str, Vec<SectionRow>>,
) -> Result<Vec<u8>, WorkbookWriteError> {
    let mut buffer = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut buffer);
        let options =
            FileOptions::<()>::default().compression_method(zip::CompressionMethod::Deflated);

        zip.start_file("[Content_Types].xml", options)?;
        zip.write_all(content_types_xml(sheets.len()).as_bytes())?;

        zip.start_file("_rels/.rels", options)?;
        zip.write_all(package_rels_xml().as_bytes())?;

        zip.start_file("xl/workbook.xml", options)?;
        zip.write_all(workbook_xml(sheets).as_bytes())?;

        zip.start_file("xl/_rels/workbook.xml.rels", options)?;
        zip.write_all(workbook_rels_xml(sheets.len()).as_bytes())?;

        zip.start_file("xl/styles.xml", options)?;
        zip.write_all(styles_xml().as_bytes())?;

        for (idx, schema) in sheets.iter().enumerate() {
            let placeholder;
            let rows: &[SectionRow] = match rows_by_sheet.get(schema.name) {
                Some(rows) if !rows.is_empty() => rows,
                // Placeholder so the sheet is never entirely empty.
                _ => {
                    placeholder = [SectionRow::blank(schema)];
                    &placeholder
                }
            };
            zip.start_file(format!("xl/worksheets/sheet{}.xml", idx + 1), options)?;
            zip.write_all(worksheet_xml(schema, rows).as_bytes())?;
        }

        zip.finish()?;
    }
    Ok(buffer.into_inner())
}

/// Build the workbook and write it to `path` in one step.
pub fn save_workbook(
    path: impl AsRef<Path>,
    sheets: &[SheetSchema],
    rows_by_sheet: &BTreeMap<&'static str, Vec<SectionRow>>,
) -> Result<(), WorkbookWriteError> {
    let bytes = write_workbook(sheets, rows_by_sheet)?;
    std::fs::write(path, bytes)?;
    Ok(())
}

fn content_types_xml(sheet_count: usize) -> String {
    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#);
    out.push('\n');
    out.push_str(r#"  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#);
    out.push('\n');
    out.push_str(r#"  <Default Extension="xml" ContentType="application/xml"/>"#);
    out.push('\n');
    out.push_str(r#"  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#);
    out.push('\n');
    out.push_str(r#"  <Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#);
    out.push('\n');
    for idx in 1..=sheet_count {
        out.push_str(&format!(
            r#"  <Override PartName="/xl/worksheets/sheet{idx}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
        out.push('\n');
    }
    out.push_str("</Types>\n");
    out
}

fn package_rels_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>
"#
    .to_owned()
}

fn workbook_xml(sheets: &[SheetSchema]) -> String {
    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(
        r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"
          xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    );
    out.push('\n');
    out.push_str("  <sheets>\n");
    for (idx, schema) in sheets.iter().enumerate() {
        let n = idx + 1;
        out.push_str(&format!(
            r#"    <sheet name="{}" sheetId="{n}" r:id="rId{n}"/>"#,
            xml_escape(schema.name)
        ));
        out.push('\n');
    }
    out.push_str("  </sheets>\n</workbook>\n");
    out
}

fn workbook_rels_xml(sheet_count: usize) -> String {
    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#);
    out.push('\n');
    for idx in 1..=sheet_count {
        out.push_str(&format!(
            r#"  <Relationship Id="rId{idx}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{idx}.xml"/>"#
        ));
        out.push('\n');
    }
    out.push_str(&format!(
        r#"  <Relationship Id="rId{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        sheet_count + 1
    ));
    out.push('\n');
    out.push_str("</Relationships>\n");
    out
}

/// Two cell formats: 0 = default, 1 = bold (header rows).
fn styles_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <fonts count="2">
    <font><sz val="11"/><name val="Calibri"/></font>
    <font><b/><sz val="11"/><name val="Calibri"/></font>
  </fonts>
  <fills count="1"><fill><patternFill patternType="none"/></fill></fills>
  <borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>
  <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
  <cellXfs count="2">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/>
  </cellXfs>
  <cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>
</styleSheet>
"#
    .to_owned()
}

fn worksheet_xml(schema: &SheetSchema, rows: &[SectionRow]) -> String {
    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#);
    out.push('\n');
    out.push_str("  <sheetData>\n");

    // Header row, bold.
    out.push_str(r#"    <row r="1">"#);
    for (col, header) in schema.headers().enumerate() {
        out.push_str(&inline_cell(col, 1, header, true));
    }
    out.push_str("</row>\n");

    for (row_idx, row) in rows.iter().enumerate() {
        let r = row_idx + 2;
        out.push_str(&format!(r#"    <row r="{r}">"#));
        for (col, value) in row.cells().iter().enumerate() {
            out.push_str(&inline_cell(col, r, value, false));
        }
        out.push_str("</row>\n");
    }

    out.push_str("  </sheetData>\n</worksheet>\n");
    out
}

fn inline_cell(col: usize, row: usize, value: &str, bold: bool) -> String {
    let style = if bold { r#" s="1""# } else { "" };
    format!(
        r#"<c r="{}{row}" t="inlineStr"{style}><is><t xml:space="preserve">{}</t></is></c>"#,
        column_letters(col),
        xml_escape(value)
    )
}

/// 0-based column index to spreadsheet letters (0 -> A, 26 -> AA).
fn column_letters(mut idx: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'A' + (idx % 26) as u8);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn column_letters_wrap_past_z() {
        assert_eq!(column_letters(0), "A");
        assert_eq!(column_letters(25), "Z");
        assert_eq!(column_letters(26), "AA");
        assert_eq!(column_letters(37), "AL");
    }

    #[test]
    fn worksheet_always_has_header_and_at_least_one_row() {
        let schema = ctos_model::sheets::NEW_SUMMARY;
        let xml = worksheet_xml(&schema, &[SectionRow::blank(&schema)]);
        assert!(xml.contains(r#"<row r="1">"#));
        assert!(xml.contains(r#"<row r="2">"#));
        assert!(xml.contains(">Account</t>"));
    }

    #[test]
    fn cell_values_are_escaped() {
        let cell = inline_cell(0, 2, "a<b&c", false);
        assert!(cell.contains("a&lt;b&amp;c"));
    }
}
