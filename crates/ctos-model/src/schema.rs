//! Schema-generation constants shared by the classifier, walker and
//! projector.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Report layout generation assigned to a combined document.
///
/// `Unknown` is legitimate: a document with no signature tags routes through
/// the generic tag-dispatch rules and simply yields fewer populated fields.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SchemaVariant {
    Old,
    New,
    Unknown,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized schema variant: {0:?} (expected \"old\", \"new\" or \"unknown\")")]
pub struct ParseSchemaVariantError(pub String);

impl std::str::FromStr for SchemaVariant {
    type Err = ParseSchemaVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "old" => Ok(SchemaVariant::Old),
            "new" => Ok(SchemaVariant::New),
            "unknown" => Ok(SchemaVariant::Unknown),
            other => Err(ParseSchemaVariantError(other.to_string())),
        }
    }
}

/// The tag names whose presence marks a document as NEW-format for one call
/// path.
///
/// The display-refresh and export paths historically check slightly different
/// sets. Both are kept as distinct named constants; do not merge them.
#[derive(Clone, Copy, Debug)]
pub struct SignatureSet {
    pub new_tags: &'static [&'static str],
}

impl SignatureSet {
    pub fn contains(&self, tag: &str) -> bool {
        self.new_tags.iter().any(|t| *t == tag)
    }
}

/// Signature set used when refreshing the display grid.
pub const DISPLAY_SIGNATURES: SignatureSet = SignatureSet {
    new_tags: &[
        "section_a",
        "section_b1",
        "section_b2",
        "section_c1",
        "section_d",
        "section_e",
        "tref",
        "tref_plus",
        "history",
        "enq_sum",
    ],
};

/// Signature set used when bucketing documents for workbook export.
pub const EXPORT_SIGNATURES: SignatureSet = SignatureSet {
    new_tags: &[
        "section_a",
        "section_b1",
        "section_b2",
        "section_c1",
        "section_d",
        "section_e",
        "tref",
        "period",
        "banking",
    ],
};

/// Generic tags of the older attribute-driven layout.
pub const OLD_SECTION_TAG: &str = "section";
pub const OLD_RECORD_TAG: &str = "record";
pub const OLD_DATA_TAG: &str = "data";

/// Closing report marker; everything after its first (case-insensitive)
/// occurrence is trailing garbage.
pub const REPORT_CLOSE: &str = "</report>";

/// Root element names of authoritative ("perfect") fragments.
pub const PERFECT_ROOTS: &[&str] = &["report", "enq_report"];

/// Synthetic root written by the sanitizer's escape fallback and by the
/// combiner when concatenation yields multiple top-level elements.
pub const SYNTHETIC_ROOT: &str = "xdoc";

/// Root written by the lenient repair serializer when the repaired body does
/// not already have a single top-level element.
pub const REPAIR_ROOT: &str = "xfrag";

/// The seven fixed aging windows, in canonical order. Extraction always emits
/// all seven, backfilling absent buckets with the sentinel.
pub const AGE_BUCKETS: &[&str] = &["30", "60", "90", "120", "150", "180", "210"];

/// Fields holding long numeric identifiers that upstream spreadsheets may
/// have corrupted into scientific notation. Renormalization applies to these
/// only, never globally.
pub const NUMERIC_ID_FIELDS: &[&str] = &[
    "account_no",
    "ref_no",
    "case_no",
    "registration_no",
    "Account No",
    "Ref No",
    "Case No",
    "Registration No",
];

/// Whether `field` designates a numeric identifier subject to
/// scientific-notation repair.
pub fn is_numeric_id_field(field: &str) -> bool {
    NUMERIC_ID_FIELDS
        .iter()
        .any(|f| f.eq_ignore_ascii_case(field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variant_parses_case_insensitively() {
        assert_eq!("NEW".parse::<SchemaVariant>().unwrap(), SchemaVariant::New);
        assert_eq!(" old ".parse::<SchemaVariant>().unwrap(), SchemaVariant::Old);
        assert!("both".parse::<SchemaVariant>().is_err());
    }

    #[test]
    fn signature_sets_drift_is_preserved() {
        // Display-only tags.
        for tag in ["tref_plus", "enq_sum", "history"] {
            assert!(DISPLAY_SIGNATURES.contains(tag));
            assert!(!EXPORT_SIGNATURES.contains(tag));
        }
        // Export-only tags.
        for tag in ["period", "banking"] {
            assert!(EXPORT_SIGNATURES.contains(tag));
            assert!(!DISPLAY_SIGNATURES.contains(tag));
        }
    }

    #[test]
    fn numeric_id_fields_match_caption_and_name_forms() {
        assert!(is_numeric_id_field("account_no"));
        assert!(is_numeric_id_field("Account No"));
        assert!(is_numeric_id_field("ACCOUNT_NO"));
        assert!(!is_numeric_id_field("outstanding"));
    }
}
