//! Domain models for the subscriber validation run.
//!
//! - [`Column`] - the 12 canonical subscriber columns, in output order
//! - [`Record`] - one input row keyed by its `OrigRowNum`
//! - [`SubscriberTable`] - the cleaned table every artifact is derived from
//! - [`Finding`] - one recorded rule violation
//! - [`FlagOverlay`] - last message recorded per flagged cell

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Name of the injected row-number column.
pub const ROW_NUM_COLUMN: &str = "OrigRowNum";

/// Placeholder used for run-level findings that have no row, column or value.
pub const NOT_APPLICABLE: &str = "N/A";

// =============================================================================
// Column Schema
// =============================================================================

/// A canonical subscriber column.
///
/// Declaration order is the fixed column order of every cleaned output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Customer,
    Lat,
    Lon,
    Address,
    City,
    State,
    Zip,
    Download,
    Upload,
    VoipLinesQuantity,
    BusinessCustomer,
    Technology,
}

impl Column {
    /// All required columns in canonical order.
    pub const ALL: [Column; 12] = [
        Column::Customer,
        Column::Lat,
        Column::Lon,
        Column::Address,
        Column::City,
        Column::State,
        Column::Zip,
        Column::Download,
        Column::Upload,
        Column::VoipLinesQuantity,
        Column::BusinessCustomer,
        Column::Technology,
    ];

    /// Canonical lowercase header name.
    pub fn name(self) -> &'static str {
        match self {
            Column::Customer => "customer",
            Column::Lat => "lat",
            Column::Lon => "lon",
            Column::Address => "address",
            Column::City => "city",
            Column::State => "state",
            Column::Zip => "zip",
            Column::Download => "download",
            Column::Upload => "upload",
            Column::VoipLinesQuantity => "voip_lines_quantity",
            Column::BusinessCustomer => "business_customer",
            Column::Technology => "technology",
        }
    }

    /// Position in the canonical order (0-based, `OrigRowNum` excluded).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Match an input header case-insensitively against the canonical names.
    pub fn from_header(header: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(header))
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Header row of every cleaned output: `OrigRowNum` then the canonical columns.
pub fn cleaned_header() -> Vec<&'static str> {
    std::iter::once(ROW_NUM_COLUMN)
        .chain(Column::ALL.iter().map(|c| c.name()))
        .collect()
}

// =============================================================================
// Records
// =============================================================================

/// One subscriber row with its raw (untrimmed) cell values.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    orig_row_num: u64,
    values: [String; 12],
}

impl Record {
    pub fn new(orig_row_num: u64, values: [String; 12]) -> Self {
        Self {
            orig_row_num,
            values,
        }
    }

    /// 1-based row number assigned at ingestion.
    pub fn orig_row_num(&self) -> u64 {
        self.orig_row_num
    }

    /// Raw cell value.
    pub fn get(&self, column: Column) -> &str {
        &self.values[column.index()]
    }

    /// Cell value as the validators see it: surrounding whitespace stripped.
    pub fn trimmed(&self, column: Column) -> &str {
        self.get(column).trim()
    }

    /// `OrigRowNum` followed by the raw values, in cleaned-output order.
    pub fn to_row(&self) -> Vec<String> {
        std::iter::once(self.orig_row_num.to_string())
            .chain(self.values.iter().cloned())
            .collect()
    }
}

/// The cleaned subscriber table, in input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriberTable {
    records: Vec<Record>,
}

impl SubscriberTable {
    pub fn new(records: Vec<Record>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Trimmed values of one column, in row order.
    pub fn column_values(&self, column: Column) -> Vec<&str> {
        self.records.iter().map(|r| r.trimmed(column)).collect()
    }
}

// =============================================================================
// Findings
// =============================================================================

/// One rule violation.
///
/// Run-level findings (fatal errors) carry no row, column or value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub row: Option<u64>,
    pub column: Option<Column>,
    pub message: String,
    pub value: Option<String>,
}

impl Finding {
    /// Finding for a single cell.
    pub fn cell(row: u64, column: Column, message: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            row: Some(row),
            column: Some(column),
            message: message.into(),
            value: Some(value.into()),
        }
    }

    /// Finding for a failure of the run itself.
    pub fn run_level(message: impl Into<String>) -> Self {
        Self {
            row: None,
            column: None,
            message: message.into(),
            value: None,
        }
    }

    pub fn row_label(&self) -> String {
        self.row
            .map(|r| r.to_string())
            .unwrap_or_else(|| NOT_APPLICABLE.to_string())
    }

    pub fn column_label(&self) -> &str {
        self.column.map(Column::name).unwrap_or(NOT_APPLICABLE)
    }

    pub fn value_label(&self) -> &str {
        self.value.as_deref().unwrap_or(NOT_APPLICABLE)
    }
}

// =============================================================================
// Flag Overlay
// =============================================================================

/// Cells to highlight in the corrected copy, keyed by (`OrigRowNum`, column).
///
/// A cell that fails several checks keeps only the message recorded last,
/// while every finding still goes to the error list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlagOverlay {
    cells: BTreeMap<(u64, Column), String>,
}

impl FlagOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for a cell, replacing any earlier one.
    pub fn flag(&mut self, row: u64, column: Column, message: impl Into<String>) {
        self.cells.insert((row, column), message.into());
    }

    pub fn get(&self, row: u64, column: Column) -> Option<&str> {
        self.cells.get(&(row, column)).map(String::as_str)
    }

    pub fn is_flagged(&self, row: u64, column: Column) -> bool {
        self.cells.contains_key(&(row, column))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u64, Column, &str)> {
        self.cells
            .iter()
            .map(|(&(row, column), message)| (row, column, message.as_str()))
    }
}

// =============================================================================
// Tests
// =============================================================================
