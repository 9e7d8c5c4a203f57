use serde::{Deserialize, Serialize};

use crate::AccountKey;

/// One per-account failure recorded during a batch run.
///
/// A bad account never aborts the batch; its error lands here and processing
/// continues with the next account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountError {
    pub account: AccountKey,
    pub message: String,
}

/// Summary of one batch run, printable and JSON-serializable at the CLI
/// boundary.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchReport {
    pub accounts_processed: usize,
    pub errors: Vec<AccountError>,
}

impl BatchReport {
    pub fn record_error(&mut self, account: &AccountKey, message: impl Into<String>) {
        self.errors.push(AccountError {
            account: account.clone(),
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn report_serializes_with_transparent_account_keys() {
        let mut report = BatchReport {
            accounts_processed: 2,
            errors: Vec::new(),
        };
        report.record_error(&AccountKey::new("900123"), "unexpected node shape");

        let json = serde_json::to_value(&report).expect("serialize report");
        assert_eq!(json["accounts_processed"], 2);
        assert_eq!(json["errors"][0]["account"], "900123");
    }
}
