//! Header handling.
//!
//! - [`ColumnMapping`] resolves the canonical columns against the input
//!   headers and projects raw rows onto the cleaned table.
//! - [`precheck_headers`] is the lighter report shown before a run: case
//!   mismatches, misspelled, repeated and missing headers. It never fails.

use serde::{Deserialize, Serialize};

use crate::error::{HeaderError, HeaderResult};
use crate::models::{Column, Record, SubscriberTable, NOT_APPLICABLE};

// =============================================================================
// Normalization
// =============================================================================

/// Input position of every canonical column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMapping {
    indices: [usize; 12],
}

impl ColumnMapping {
    /// Match each canonical column case-insensitively. When two input
    /// headers fold to the same name the first one is used.
    pub fn resolve(headers: &[String]) -> HeaderResult<Self> {
        let mut indices = [0usize; 12];
        let mut missing = Vec::new();

        for column in Column::ALL {
            match headers
                .iter()
                .position(|h| h.eq_ignore_ascii_case(column.name()))
            {
                Some(index) => indices[column.index()] = index,
                None => missing.push(column.name().to_string()),
            }
        }

        if missing.is_empty() {
            Ok(Self { indices })
        } else {
            Err(HeaderError::MissingColumns(missing))
        }
    }

    /// Input position of a canonical column.
    pub fn source_index(&self, column: Column) -> usize {
        self.indices[column.index()]
    }

    /// Select and reorder the canonical cells of one raw row.
    pub fn project(&self, orig_row_num: u64, row: &[String]) -> Record {
        let values = self
            .indices
            .map(|index| row.get(index).cloned().unwrap_or_default());
        Record::new(orig_row_num, values)
    }
}

/// Pair every row with its 1-based `OrigRowNum`, in input order.
pub fn number_rows(rows: Vec<Vec<String>>) -> Vec<(u64, Vec<String>)> {
    rows.into_iter()
        .enumerate()
        .map(|(i, row)| (i as u64 + 1, row))
        .collect()
}

/// Build the cleaned table: `OrigRowNum` then the canonical columns.
///
/// Columns that are not canonical, including any input `OrigRowNum`, are dropped.
pub fn normalize_headers(
    headers: &[String],
    rows: &[(u64, Vec<String>)],
) -> HeaderResult<SubscriberTable> {
    let mapping = ColumnMapping::resolve(headers)?;
    let records = rows
        .iter()
        .map(|(num, row)| mapping.project(*num, row))
        .collect();
    Ok(SubscriberTable::new(records))
}

// =============================================================================
// Pre-check
// =============================================================================

/// One header problem reported by [`precheck_headers`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderIssue {
    pub actual: String,
    pub expected: String,
    pub issue: String,
    pub message: String,
}

/// Spreadsheet column letter for a 0-based index: A..Z, AA, AB, ...
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(b'A' + (n % 26) as u8);
        n /= 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Report header problems without aborting.
///
/// Issues come grouped by kind: case mismatches, unknown headers, repeated
/// unknown headers, then missing columns.
pub fn precheck_headers(headers: &[String]) -> Vec<HeaderIssue> {
    let mut issues = Vec::new();

    for header in headers {
        if let Some(column) = Column::from_header(header) {
            if header != column.name() {
                issues.push(HeaderIssue {
                    actual: header.clone(),
                    expected: column.name().to_string(),
                    issue: "Uppercase".to_string(),
                    message: format!("Header '{header}' is uppercase, expected '{column}'"),
                });
            }
        }
    }

    for header in headers.iter().filter(|h| Column::from_header(h).is_none()) {
        // Position of the first occurrence, so repeats point at the same slot
        let expected = headers
            .iter()
            .position(|h| h == header)
            .and_then(|i| Column::ALL.get(i))
            .map(|c| c.name())
            .unwrap_or(NOT_APPLICABLE);
        issues.push(HeaderIssue {
            actual: header.clone(),
            expected: expected.to_string(),
            issue: "Incorrect spelling".to_string(),
            message: format!("Header '{header}' is incorrect, expected '{expected}'"),
        });
    }

    for (i, header) in headers.iter().enumerate() {
        if Column::from_header(header).is_none() && headers[..i].contains(header) {
            let letter = column_letter(i);
            issues.push(HeaderIssue {
                actual: header.clone(),
                expected: NOT_APPLICABLE.to_string(),
                issue: format!("Extra column in column {letter}"),
                message: format!("Extra column '{header}' in column {letter}"),
            });
        }
    }

    for column in Column::ALL {
        if !headers.iter().any(|h| h.eq_ignore_ascii_case(column.name())) {
            issues.push(HeaderIssue {
                actual: NOT_APPLICABLE.to_string(),
                expected: column.name().to_string(),
                issue: "Missing column".to_string(),
                message: format!("Missing column: {column}"),
            });
        }
    }

    issues
}
