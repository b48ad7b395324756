//! Subscriber validation.
//!
//! Runs the column rules over a cleaned [`SubscriberTable`] and collects the
//! outcome as a [`ValidationReport`]:
//!
//! - `findings`: every violation, in the order the rules found them
//! - `flags`: the cells to highlight, keeping the last message per cell
//!
//! # Rule Order
//!
//! Columns are visited in canonical order (`customer` first, `technology`
//! last). Within a column the validator decides the order; see [`rules`].
//!
//! # Example
//!
//! ```rust,ignore
//! use subval::validation::validate_table;
//!
//! let report = validate_table(&table);
//! for finding in &report.findings {
//!     println!("{} {} {}", finding.row_label(), finding.column_label(), finding.message);
//! }
//! ```

pub mod address;
pub mod predicates;
pub mod rules;

use crate::models::{Column, Finding, FlagOverlay, SubscriberTable};

pub use address::{check_address, match_grammar, GrammarOutcome};
pub use rules::{validator_for, ColumnValidator, RuleContext, COLUMN_RULES};

/// Outcome of validating one table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationReport {
    pub findings: Vec<Finding>,
    pub flags: FlagOverlay,
}

impl ValidationReport {
    /// Record a cell finding and flag the cell with the same message.
    pub fn record(&mut self, row: u64, column: Column, message: String, value: &str) {
        self.flags.flag(row, column, message.clone());
        self.findings.push(Finding::cell(row, column, message, value));
    }

    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }
}

/// Run every column rule over the table.
pub fn validate_table(table: &SubscriberTable) -> ValidationReport {
    let mut report = ValidationReport::default();

    for (column, rule) in COLUMN_RULES.iter() {
        let ctx = RuleContext::new(table, *column);
        for issue in rule(&ctx) {
            let record = &table.records()[issue.index];
            report.record(
                record.orig_row_num(),
                *column,
                issue.message,
                ctx.values[issue.index],
            );
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;

    fn row(num: u64, customer: &str, lat: &str, lon: &str, state: &str, tech: &str) -> Record {
        Record::new(
            num,
            [
                customer.into(),
                lat.into(),
                lon.into(),
                "123 Main St".into(),
                "Austin".into(),
                state.into(),
                "78701".into(),
                "100".into(),
                "20".into(),
                "".into(),
                "1".into(),
                tech.into(),
            ],
        )
    }

    #[test]
    fn test_clean_table() {
        let table = SubscriberTable::new(vec![
            row(1, "CUST1", "30.2", "-97.7", "TX", "fiber"),
            row(2, "CUST2", "13.4", "144.8", "GU", "FIBER"),
        ]);
        let report = validate_table(&table);
        assert!(report.is_clean(), "{:?}", report.findings);
        assert!(report.flags.is_empty());
    }

    #[test]
    fn test_findings_carry_row_column_and_trimmed_value() {
        let table = SubscriberTable::new(vec![row(1, "CUST1", " 91 ", "-97.7", "TX", "fiber")]);
        let report = validate_table(&table);

        assert_eq!(report.findings.len(), 1);
        let finding = &report.findings[0];
        assert_eq!(finding.row, Some(1));
        assert_eq!(finding.column, Some(Column::Lat));
        assert_eq!(finding.message, "Latitude must be between -90 and 90");
        assert_eq!(finding.value.as_deref(), Some("91"));
        assert!(report.flags.is_flagged(1, Column::Lat));
    }

    #[test]
    fn test_duplicates_reported_on_both_rows() {
        let table = SubscriberTable::new(vec![
            row(1, "CUST1", "30.2", "-97.7", "TX", "fiber"),
            row(2, "CUST1", "30.2", "-97.7", "TX", "fiber"),
        ]);
        let report = validate_table(&table);

        let rows: Vec<Option<u64>> = report.findings.iter().map(|f| f.row).collect();
        assert_eq!(rows, vec![Some(1), Some(2)]);
        assert!(report
            .findings
            .iter()
            .all(|f| f.message == "Duplicate customer ID"));
    }

    #[test]
    fn test_findings_follow_column_order() {
        let table = SubscriberTable::new(vec![row(1, "A,B", "x", "50", "TX", "satellite")]);
        let report = validate_table(&table);

        let columns: Vec<Column> = report.findings.iter().filter_map(|f| f.column).collect();
        assert_eq!(
            columns,
            vec![Column::Customer, Column::Lat, Column::Lon, Column::Technology]
        );
    }

    #[test]
    fn test_flag_keeps_last_message_per_cell() {
        let table = SubscriberTable::new(vec![
            row(1, "A,B", "30.2", "-97.7", "TX", "fiber"),
            row(2, "A,B", "30.2", "-97.7", "TX", "fiber"),
        ]);
        let report = validate_table(&table);

        assert_eq!(report.findings.len(), 4);
        assert_eq!(report.flags.len(), 2);
        assert_eq!(report.flags.get(1, Column::Customer), Some("Duplicate customer ID"));
    }

    #[test]
    fn test_blank_state_yields_two_findings() {
        let table = SubscriberTable::new(vec![row(1, "CUST1", "", "", "  ", "")]);
        let report = validate_table(&table);

        let messages: Vec<&str> = report.findings.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], "Blank or whitespace-only value");
        assert!(messages[1].starts_with("Invalid state."));
    }
}
