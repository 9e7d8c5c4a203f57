use serde::{Deserialize, Serialize};

/// Sequence key assigned to fragment rows that carry no explicit value.
pub const DEFAULT_SEQUENCE: i64 = 0;

/// Normalized account identifier (`NU_PTL`) under which XML fragments are
/// grouped.
///
/// Identifiers are trimmed but case-preserved. Some upstream systems emit
/// multi-part identifiers (`"900123_1"`, `"900123_2"`) that belong to one
/// logical account; [`AccountKey::collapse`] strips the `_`-suffix so those
/// group together.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountKey(String);

impl AccountKey {
    pub fn new(raw: &str) -> Self {
        AccountKey(raw.trim().to_string())
    }

    /// The logical account this key belongs to: everything before the first
    /// underscore, or the whole key when there is none.
    pub fn collapse(&self) -> AccountKey {
        match self.0.split_once('_') {
            Some((head, _)) => AccountKey(head.to_string()),
            None => self.clone(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for AccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One raw XML blob from one input row. Immutable once read; discarded after
/// combination.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawFragment {
    /// Trimmed but uncollapsed account identifier as it appeared in the input.
    pub account: AccountKey,
    /// Row-sequence key; fragments for one account concatenate in ascending
    /// order of this value.
    pub sequence: i64,
    pub xml: String,
}

impl RawFragment {
    pub fn new(account: &str, sequence: i64, xml: impl Into<String>) -> Self {
        RawFragment {
            account: AccountKey::new(account),
            sequence,
            xml: xml.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn key_is_trimmed_but_case_preserved() {
        assert_eq!(AccountKey::new("  AbC123 ").as_str(), "AbC123");
    }

    #[test]
    fn collapse_strips_first_underscore_suffix() {
        assert_eq!(AccountKey::new("900123_2").collapse().as_str(), "900123");
        assert_eq!(AccountKey::new("900123_2_b").collapse().as_str(), "900123");
        assert_eq!(AccountKey::new("900123").collapse().as_str(), "900123");
    }
}
