//! Best-effort markup repair for report fragments.
//!
//! Upstream systems deliver XML inside spreadsheet cells: truncated bodies,
//! trailing junk after the closing report tag, stray control characters, and
//! occasionally content that is not XML at all. `sanitize` recovers a
//! parseable document from any of that without ever failing: strict parse
//! first, then a lenient event-level repair, then an escape-and-wrap
//! fallback.

use ctos_model::schema::{REPAIR_ROOT, REPORT_CLOSE, SYNTHETIC_ROOT};
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::Reader;

/// Repair `text` into something a strict XML parser accepts.
///
/// Guarantees, for any input:
/// - never panics and never returns an error;
/// - the output parses with a standard XML parser;
/// - `sanitize(sanitize(x)) == sanitize(x)`.
///
/// Empty (or whitespace-only) input yields an empty synthetic-root document.
pub fn sanitize(text: &str) -> String {
    let text = truncate_after_report_close(text);
    let text = strip_illegal_chars(&text);
    let text = text.trim();

    if text.is_empty() {
        return format!("<{SYNTHETIC_ROOT}/>");
    }
    if roxmltree::Document::parse(text).is_ok() {
        return text.to_string();
    }
    if let Some(repaired) = lenient_repair(text) {
        if roxmltree::Document::parse(&repaired).is_ok() {
            return repaired;
        }
    }
    escape_and_wrap(text)
}

/// Everything after the first (case-insensitive) closing report tag is
/// trailing garbage appended by upstream systems; drop it.
fn truncate_after_report_close(text: &str) -> String {
    match text.to_ascii_lowercase().find(REPORT_CLOSE) {
        Some(idx) => text[..idx + REPORT_CLOSE.len()].to_string(),
        None => text.to_string(),
    }
}

/// Strip characters that XML 1.0 forbids outright: the C0 controls except
/// tab/LF/CR, plus the two BMP noncharacters.
fn strip_illegal_chars(text: &str) -> String {
    text.chars().filter(|ch| !is_illegal_char(*ch)).collect()
}

fn is_illegal_char(ch: char) -> bool {
    matches!(ch,
        '\u{00}'..='\u{08}' | '\u{0B}' | '\u{0C}' | '\u{0E}'..='\u{1F}' | '\u{FFFE}' | '\u{FFFF}')
}

/// Event-level repair: re-serialize whatever structure the tokenizer can
/// still see, auto-closing unclosed elements and dropping stray end tags.
///
/// Returns `None` when the tokenizer gives up entirely; the caller then falls
/// through to the escape wrapper. The result is wrapped in a repair root only
/// when it does not already have exactly one top-level node.
fn lenient_repair(text: &str) -> Option<String> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().check_end_names = false;
    reader.config_mut().allow_unmatched_ends = true;

    let mut out = String::new();
    let mut stack: Vec<String> = Vec::new();
    let mut top_level_nodes = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if stack.is_empty() {
                    top_level_nodes += 1;
                }
                let name = element_name(&e);
                write_open_tag(&mut out, &name, &e, false);
                stack.push(name);
            }
            Ok(Event::Empty(e)) => {
                if stack.is_empty() {
                    top_level_nodes += 1;
                }
                let name = element_name(&e);
                write_open_tag(&mut out, &name, &e, true);
            }
            Ok(Event::End(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if let Some(pos) = stack.iter().rposition(|open| *open == name) {
                    // Close intervening unclosed elements, innermost first.
                    for open in stack.drain(pos..).rev() {
                        out.push_str("</");
                        out.push_str(&open);
                        out.push('>');
                    }
                }
                // An end tag with no matching opener is dropped.
            }
            Ok(Event::Text(e)) => {
                let raw = text_content(&e);
                if stack.is_empty() && !raw.trim().is_empty() {
                    top_level_nodes += 1;
                }
                out.push_str(&xml_escape(&raw));
            }
            Ok(Event::CData(e)) => {
                if stack.is_empty() {
                    top_level_nodes += 1;
                }
                out.push_str(&xml_escape(&String::from_utf8_lossy(&e)));
            }
            Ok(Event::Eof) => break,
            // Declarations, comments, PIs and doctypes carry nothing the
            // extractor consumes; drop them.
            Ok(_) => {}
            Err(_) => return None,
        }
    }

    for open in stack.drain(..).rev() {
        out.push_str("</");
        out.push_str(&open);
        out.push('>');
    }

    if top_level_nodes == 1 {
        Some(out)
    } else {
        Some(format!("<{REPAIR_ROOT}>{out}</{REPAIR_ROOT}>"))
    }
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn write_open_tag(out: &mut String, name: &str, e: &BytesStart<'_>, self_closing: bool) {
    out.push('<');
    out.push_str(name);
    for attr in e.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = match attr.unescape_value() {
            Ok(v) => v.into_owned(),
            Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
        };
        out.push(' ');
        out.push_str(&key);
        out.push_str("=\"");
        out.push_str(&xml_escape(&value));
        out.push('"');
    }
    if self_closing {
        out.push('/');
    }
    out.push('>');
}

fn text_content(e: &BytesText<'_>) -> String {
    match e.unescape() {
        Ok(t) => t.into_owned(),
        // Broken entity references: keep the raw text and let the escape
        // below neutralize it.
        Err(_) => String::from_utf8_lossy(e).into_owned(),
    }
}

/// Last resort: the whole input becomes escaped character data under the
/// synthetic root. Semantically useless downstream, but parseable.
fn escape_and_wrap(text: &str) -> String {
    format!(
        "<{SYNTHETIC_ROOT}>{}</{SYNTHETIC_ROOT}>",
        xml_escape(text)
    )
}

pub(crate) fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
