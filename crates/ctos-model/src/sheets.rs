//! Fixed per-sheet column schemas for workbook export.
//!
//! The old and new report generations use independent schema tables with
//! different column counts, naming, and missing-value sentinels. They are
//! deliberately not unified: OLD sheets backfill with `"-"`, NEW sheets with
//! the empty string, and downstream consumers may depend on either
//! convention.

/// One export column: the spreadsheet header plus the extracted field name
/// that feeds it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Column {
    pub header: &'static str,
    pub field: &'static str,
}

const fn col(header: &'static str, field: &'static str) -> Column {
    Column { header, field }
}

/// Fixed ordered column list for one export sheet.
#[derive(Clone, Copy, Debug)]
pub struct SheetSchema {
    pub name: &'static str,
    /// Value used for columns no extracted field matched.
    pub sentinel: &'static str,
    pub columns: &'static [Column],
}

impl SheetSchema {
    pub fn column_index(&self, field: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.field.eq_ignore_ascii_case(field))
    }

    pub fn headers(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.columns.iter().map(|c| c.header)
    }
}

/// A fixed-width row for one sheet; cells align with the schema's columns.
/// Never mutated after it is appended to a sheet's row list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionRow {
    cells: Vec<String>,
}

impl SectionRow {
    /// A row with every column set to the sheet's sentinel.
    pub fn blank(schema: &SheetSchema) -> Self {
        SectionRow {
            cells: vec![schema.sentinel.to_string(); schema.columns.len()],
        }
    }

    /// Copy `value` into the column fed by `field`, if the schema declares
    /// one. Unmatched fields are dropped.
    pub fn set_field(&mut self, schema: &SheetSchema, field: &str, value: &str) -> bool {
        match schema.column_index(field) {
            Some(idx) => {
                self.cells[idx] = value.to_string();
                true
            }
            None => false,
        }
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

const SENTINEL_OLD: &str = "-";
const SENTINEL_NEW: &str = "";

// New-format sheets.

pub const NEW_SUMMARY: SheetSchema = SheetSchema {
    name: "Summary",
    sentinel: SENTINEL_NEW,
    columns: &[
        col("Account", "nu_ptl"),
        col("Report No", "report_no"),
        col("Name", "name"),
        col("IC No", "ic_no"),
        col("New IC No", "new_ic_no"),
        col("Address", "address"),
        col("Date", "date"),
        col("Purpose", "purpose"),
        col("Status", "status"),
        col("Total Enquiries", "total_enquiries"),
        col("Total Accounts", "total_accounts"),
        col("Outstanding", "outstanding"),
        col("Legal Suits", "legal_suits"),
        col("Special Attention", "special_attention"),
    ],
};

pub const NEW_SECTION_A: SheetSchema = SheetSchema {
    name: "Section A",
    sentinel: SENTINEL_NEW,
    columns: &[
        col("Account", "nu_ptl"),
        col("Record", "record_seq"),
        col("Name", "name"),
        col("Old IC", "old_ic"),
        col("New IC", "new_ic"),
        col("Date of Birth", "birth_date"),
        col("Nationality", "nationality"),
        col("Gender", "gender"),
        col("Address", "address"),
        col("Postcode", "postcode"),
        col("State", "state"),
        col("Source", "source"),
        col("Entry Date", "entry_date"),
        col("Remark", "remark"),
    ],
};

pub const NEW_SECTION_B: SheetSchema = SheetSchema {
    name: "Section B",
    sentinel: SENTINEL_NEW,
    columns: &[
        col("Account", "nu_ptl"),
        col("Record", "record_seq"),
        col("Lender", "lender"),
        col("Facility", "facility"),
        col("Account No", "account_no"),
        col("Status", "status"),
        col("Capacity", "capacity"),
        col("Limit", "limit"),
        col("Outstanding", "outstanding"),
        col("Installment", "installment"),
        col("Collateral", "collateral"),
        col("Repayment Term", "repayment_term"),
        col("Start Date", "start_date"),
        col("End Date", "end_date"),
        col("Last Update", "last_update"),
        col("Aging 30", "age_30"),
        col("Aging 60", "age_60"),
        col("Aging 90", "age_90"),
        col("Aging 120", "age_120"),
        col("Aging 150", "age_150"),
        col("Aging 180", "age_180"),
        col("Aging 210", "age_210"),
        col("Legal Status", "legal_status"),
        col("Remark", "remark"),
    ],
};

pub const NEW_SECTION_C: SheetSchema = SheetSchema {
    name: "Section C",
    sentinel: SENTINEL_NEW,
    columns: &[
        col("Account", "nu_ptl"),
        col("Record", "record_seq"),
        col("Company", "company"),
        col("Registration No", "registration_no"),
        col("Incorporated", "incorporated"),
        col("Position", "position"),
        col("Appointed", "appointed"),
        col("Shareholding", "shareholding"),
        col("Paid Up", "paid_up"),
        col("Nature of Business", "nature_of_business"),
        col("Status", "status"),
        col("Address", "address"),
        col("Resigned", "resigned"),
        col("Source", "source"),
        col("Remark", "remark"),
    ],
};

pub const NEW_SECTION_D: SheetSchema = SheetSchema {
    name: "Section D",
    sentinel: SENTINEL_NEW,
    columns: &[
        col("Account", "nu_ptl"),
        col("Record", "record_seq"),
        col("Case No", "case_no"),
        col("Court", "court"),
        col("Case Type", "case_type"),
        col("Filed Date", "filed_date"),
        col("Amount", "amount"),
        col("Status", "status"),
        col("Plaintiff", "plaintiff"),
        col("Defendant", "defendant"),
        col("Hearing Date", "hearing_date"),
        col("Settlement", "settlement"),
        col("Lawyer", "lawyer"),
        col("Other Party 1 Name", "other_party_1_name"),
        col("Other Party 1 IC", "other_party_1_ic_no"),
        col("Other Party 2 Name", "other_party_2_name"),
        col("Other Party 2 IC", "other_party_2_ic_no"),
        col("Source", "source"),
        col("Entry Date", "entry_date"),
        col("Remark", "remark"),
    ],
};

pub const NEW_TRADE_REFERENCE: SheetSchema = SheetSchema {
    name: "Trade Reference",
    sentinel: SENTINEL_NEW,
    columns: &[
        col("Account", "nu_ptl"),
        col("Record", "record_seq"),
        col("Referee", "referee"),
        col("Account No", "account_no"),
        col("Relationship", "relationship"),
        col("Subject", "subject"),
        col("Start Date", "start_date"),
        col("Credit Terms", "credit_terms"),
        col("Credit Limit", "credit_limit"),
        col("Outstanding", "outstanding"),
        col("Overdue", "overdue"),
        col("Status", "status"),
        col("Aging 30", "age_30"),
        col("Aging 60", "age_60"),
        col("Aging 90", "age_90"),
        col("Aging 120", "age_120"),
        col("Aging 150", "age_150"),
        col("Aging 180", "age_180"),
        col("Aging 210", "age_210"),
        col("Last Payment Date", "last_payment_date"),
        col("Payment Mode", "payment_mode"),
        col("Contact Person", "contact_person"),
        col("Phone", "phone"),
        col("Fax", "fax"),
        col("Mobile", "mobile"),
        col("Email", "email"),
        col("Position", "position"),
        col("Address", "address"),
        col("Remark", "remark"),
        col("Date Submitted", "date_submitted"),
        col("Enquiry Date", "enquiry_date"),
        col("Purpose", "purpose"),
        col("Amount", "amount"),
        col("Reference No", "ref_no"),
        col("Source", "source"),
        col("Entry Date", "entry_date"),
        col("Sued", "sued"),
        col("Settled", "settled"),
    ],
};

// Old-format sheets. Fields match the caption/name strings the old layout's
// `data` elements resolve to, so lookups stay case-insensitive.

pub const OLD_REPORT_INFO: SheetSchema = SheetSchema {
    name: "Report Info",
    sentinel: SENTINEL_OLD,
    columns: &[
        col("Account", "nu_ptl"),
        col("Report No", "report_no"),
        col("Name", "name"),
        col("IC No", "ic_no"),
        col("New IC No", "new_ic_no"),
        col("Address", "address"),
        col("Report Date", "report_date"),
        col("Purpose", "purpose"),
        col("Branch", "branch"),
        col("Total Accounts", "Total Accounts"),
        col("Total Enquiries", "Total Enquiries"),
        col("Outstanding", "Outstanding"),
        col("Legal Suits", "Legal Suits"),
        col("Special Attention", "Special Attention"),
    ],
};

pub const OLD_ACCOUNT_RECORDS: SheetSchema = SheetSchema {
    name: "Account Records",
    sentinel: SENTINEL_OLD,
    columns: &[
        col("Account", "nu_ptl"),
        col("Section", "section_title"),
        col("Record", "record_seq"),
        col("Name", "Name"),
        col("Lender", "Lender"),
        col("Facility", "Facility"),
        col("Account No", "Account No"),
        col("Status", "Status"),
        col("Capacity", "Capacity"),
        col("Limit", "Limit"),
        col("Outstanding", "Outstanding"),
        col("Installment", "Installment"),
        col("Aging 30", "age_30"),
        col("Aging 60", "age_60"),
        col("Aging 90", "age_90"),
        col("Aging 120", "age_120"),
        col("Aging 150", "age_150"),
        col("Aging 180", "age_180"),
        col("Aging 210", "age_210"),
        col("Last Update", "Last Update"),
        col("Legal Status", "Legal Status"),
        col("Remark", "Remark"),
    ],
};

/// All new-format sheets, in workbook order.
pub const NEW_SHEETS: &[SheetSchema] = &[
    NEW_SUMMARY,
    NEW_SECTION_A,
    NEW_SECTION_B,
    NEW_SECTION_C,
    NEW_SECTION_D,
    NEW_TRADE_REFERENCE,
];

/// All old-format sheets, in workbook order.
pub const OLD_SHEETS: &[SheetSchema] = &[OLD_REPORT_INFO, OLD_ACCOUNT_RECORDS];

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn sentinel_asymmetry_is_preserved() {
        for sheet in NEW_SHEETS {
            assert_eq!(sheet.sentinel, "");
        }
        for sheet in OLD_SHEETS {
            assert_eq!(sheet.sentinel, "-");
        }
    }

    #[test]
    fn blank_row_is_fixed_width() {
        let row = SectionRow::blank(&NEW_SECTION_B);
        assert_eq!(row.cells().len(), NEW_SECTION_B.columns.len());
        assert!(row.cells().iter().all(|c| c.is_empty()));

        let row = SectionRow::blank(&OLD_ACCOUNT_RECORDS);
        assert!(row.cells().iter().all(|c| c == "-"));
    }

    #[test]
    fn set_field_matches_case_insensitively_and_drops_unknown() {
        let mut row = SectionRow::blank(&OLD_ACCOUNT_RECORDS);
        assert!(row.set_field(&OLD_ACCOUNT_RECORDS, "account no", "123"));
        assert_eq!(
            row.cells()[OLD_ACCOUNT_RECORDS.column_index("Account No").unwrap()],
            "123"
        );
        assert!(!row.set_field(&OLD_ACCOUNT_RECORDS, "no_such_field", "x"));
    }

    #[test]
    fn aging_columns_cover_all_seven_buckets() {
        for sheet in [&NEW_SECTION_B, &NEW_TRADE_REFERENCE, &OLD_ACCOUNT_RECORDS] {
            for bucket in crate::schema::AGE_BUCKETS {
                assert!(
                    sheet.column_index(&format!("age_{bucket}")).is_some(),
                    "{} missing bucket {bucket}",
                    sheet.name
                );
            }
        }
    }
}
