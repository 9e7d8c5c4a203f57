use serde::{Deserialize, Serialize};

/// Sentinel used on the display path for absent values and section markers.
pub const DISPLAY_SENTINEL: &str = "-";

/// What a flattened field represents in the display list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Ordinary field/value pair.
    Value,
    /// Section boundary marker; display consumers render these bold.
    Section,
    /// Record boundary marker within a section.
    Record,
    /// Blank separator between repeated sub-groups (trade-reference
    /// enquiries).
    Spacer,
    /// Extraction failed for this document; `value` carries the error text.
    Error,
}

/// One entry of the flattened field/value list produced for a combined
/// document.
///
/// Field names are not unique: repeated `Record` markers and repeated section
/// fields are intentional and encode record boundaries in the flat list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub kind: FieldKind,
}

impl Field {
    pub fn value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Field {
            name: name.into(),
            value: value.into(),
            kind: FieldKind::Value,
        }
    }

    pub fn section(title: impl Into<String>) -> Self {
        Field {
            name: title.into(),
            value: DISPLAY_SENTINEL.to_string(),
            kind: FieldKind::Section,
        }
    }

    pub fn record(seq: impl Into<String>) -> Self {
        Field {
            name: "Record".to_string(),
            value: seq.into(),
            kind: FieldKind::Record,
        }
    }

    pub fn spacer() -> Self {
        Field {
            name: String::new(),
            value: String::new(),
            kind: FieldKind::Spacer,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Field {
            name: "Error".to_string(),
            value: message.into(),
            kind: FieldKind::Error,
        }
    }

    /// Whether display consumers should render this row bold.
    pub fn is_bold(&self) -> bool {
        matches!(self.kind, FieldKind::Section)
    }
}
