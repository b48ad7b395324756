//! Per-column validators and the column → validator dispatch table.
//!
//! Each validator sees the whole table so it can look across rows (customer
//! duplicates) or across columns (longitude bounds depend on `state`). It
//! returns its issues in the order they are found; the caller turns them into
//! findings and flags in that same order.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::address::check_address;
use super::predicates::{integer_sign, parse_real, IntegerSign};
use crate::models::{Column, SubscriberTable};
use crate::reference::{
    is_valid_state, is_valid_technology, lon_range, quoted_list, requires_negative_lon,
    VALID_STATES, VALID_TECHNOLOGIES,
};

/// Fastest advertised speed accepted, in Mbps.
pub const MAX_SPEED_MBPS: f64 = 3000.0;

pub const BLANK_VALUE: &str = "Blank or whitespace-only value";

static ZIP_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{5}(-[0-9]{4})?$").expect("valid zip pattern"));

/// One failed check for the row at `index` (position in the table).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellIssue {
    pub index: usize,
    pub message: String,
}

impl CellIssue {
    fn new(index: usize, message: impl Into<String>) -> Self {
        Self {
            index,
            message: message.into(),
        }
    }
}

/// What a column validator gets to look at.
pub struct RuleContext<'a> {
    pub table: &'a SubscriberTable,
    pub column: Column,
    /// Trimmed values of `column`, in row order
    pub values: Vec<&'a str>,
}

impl<'a> RuleContext<'a> {
    pub fn new(table: &'a SubscriberTable, column: Column) -> Self {
        Self {
            table,
            column,
            values: table.column_values(column),
        }
    }

    /// Trimmed value of another column on the same row.
    fn sibling(&self, index: usize, column: Column) -> &'a str {
        self.table.records()[index].trimmed(column)
    }
}

pub type ColumnValidator = fn(&RuleContext<'_>) -> Vec<CellIssue>;

/// Validator for every canonical column, in canonical order.
pub static COLUMN_RULES: [(Column, ColumnValidator); 12] = [
    (Column::Customer, check_customer),
    (Column::Lat, check_lat),
    (Column::Lon, check_lon),
    (Column::Address, check_address_column),
    (Column::City, check_city),
    (Column::State, check_state),
    (Column::Zip, check_zip),
    (Column::Download, check_speed),
    (Column::Upload, check_speed),
    (Column::VoipLinesQuantity, check_voip_lines),
    (Column::BusinessCustomer, check_business_customer),
    (Column::Technology, check_technology),
];

/// Look up the validator of one column.
pub fn validator_for(column: Column) -> ColumnValidator {
    COLUMN_RULES[column.index()].1
}

/// Column name with its first letter upper-cased, for messages.
fn label(column: Column) -> String {
    let name = column.name();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// =============================================================================
// Validators
// =============================================================================

fn check_customer(ctx: &RuleContext<'_>) -> Vec<CellIssue> {
    let mut issues: Vec<CellIssue> = ctx
        .values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.contains(','))
        .map(|(i, _)| CellIssue::new(i, "Customer ID contains a comma"))
        .collect();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in ctx.values.iter().copied() {
        *counts.entry(value).or_default() += 1;
    }
    issues.extend(
        ctx.values
            .iter()
            .enumerate()
            .filter(|(_, v)| counts.get(*v).copied().unwrap_or(0) > 1)
            .map(|(i, _)| CellIssue::new(i, "Duplicate customer ID")),
    );
    issues
}

fn check_lat(ctx: &RuleContext<'_>) -> Vec<CellIssue> {
    let mut issues = Vec::new();
    for (i, value) in ctx.values.iter().enumerate() {
        if value.is_empty() {
            continue;
        }
        match parse_real(value) {
            None => issues.push(CellIssue::new(i, "Lat must be a number or blank")),
            Some(lat) if !(-90.0..=90.0).contains(&lat) => {
                issues.push(CellIssue::new(i, "Latitude must be between -90 and 90"))
            }
            Some(_) => {}
        }
    }
    issues
}

fn check_lon(ctx: &RuleContext<'_>) -> Vec<CellIssue> {
    let mut issues = Vec::new();
    for (i, value) in ctx.values.iter().enumerate() {
        if value.is_empty() {
            continue;
        }
        let Some(lon) = parse_real(value) else {
            issues.push(CellIssue::new(i, "Lon must be a number or blank"));
            continue;
        };

        let state = ctx.sibling(i, Column::State).to_uppercase();
        let Some(range) = lon_range(&state) else {
            continue;
        };

        if requires_negative_lon(&state) && lon > 0.0 {
            issues.push(CellIssue::new(
                i,
                format!("Longitude for {state} must be negative"),
            ));
        } else if !range.contains(lon) {
            issues.push(CellIssue::new(
                i,
                format!(
                    "Longitude for {state} must be between {} and {}",
                    range.min, range.max
                ),
            ));
        }
    }
    issues
}

fn check_address_column(ctx: &RuleContext<'_>) -> Vec<CellIssue> {
    let mut issues = Vec::new();
    for (i, value) in ctx.values.iter().enumerate() {
        if value.is_empty() {
            issues.push(CellIssue::new(i, BLANK_VALUE));
            continue;
        }
        issues.extend(
            check_address(value)
                .into_iter()
                .map(|message| CellIssue::new(i, message)),
        );
    }
    issues
}

fn check_city(ctx: &RuleContext<'_>) -> Vec<CellIssue> {
    let mut issues = Vec::new();
    for (i, value) in ctx.values.iter().enumerate() {
        if value.is_empty() {
            issues.push(CellIssue::new(i, BLANK_VALUE));
        } else if value.chars().any(|c| c.is_ascii_digit()) {
            issues.push(CellIssue::new(i, "City name contains digits"));
        }
    }
    issues
}

fn check_state(ctx: &RuleContext<'_>) -> Vec<CellIssue> {
    let mut issues = Vec::new();
    for (i, value) in ctx.values.iter().enumerate() {
        if value.is_empty() {
            issues.push(CellIssue::new(i, BLANK_VALUE));
        }
        // A blank state is also not a valid code; both findings are kept
        if !is_valid_state(value) {
            issues.push(CellIssue::new(
                i,
                format!("Invalid state. Must be one of {}", quoted_list(&VALID_STATES)),
            ));
        }
    }
    issues
}

fn check_zip(ctx: &RuleContext<'_>) -> Vec<CellIssue> {
    let mut issues = Vec::new();
    for (i, value) in ctx.values.iter().enumerate() {
        if value.is_empty() {
            issues.push(CellIssue::new(i, BLANK_VALUE));
        } else if !ZIP_CODE.is_match(value) {
            issues.push(CellIssue::new(
                i,
                "Invalid ZIP code format. Must be 12345 or 12345-6789",
            ));
        }
    }
    issues
}

/// Shared by `download` and `upload`.
fn check_speed(ctx: &RuleContext<'_>) -> Vec<CellIssue> {
    let label = label(ctx.column);
    let mut issues = Vec::new();
    for (i, value) in ctx.values.iter().enumerate() {
        if value.is_empty() {
            continue;
        }
        let Some(speed) = parse_real(value) else {
            issues.push(CellIssue::new(i, format!("{label} speed must be a number")));
            continue;
        };
        if speed <= 0.0 {
            issues.push(CellIssue::new(
                i,
                format!("{label} speed must be greater than 0"),
            ));
        }
        if speed > MAX_SPEED_MBPS {
            issues.push(CellIssue::new(
                i,
                format!("{label} speed cannot exceed {MAX_SPEED_MBPS} Mbps"),
            ));
        }
    }
    issues
}

fn check_voip_lines(ctx: &RuleContext<'_>) -> Vec<CellIssue> {
    let mut issues = Vec::new();
    for (i, value) in ctx.values.iter().enumerate() {
        if value.is_empty() {
            continue;
        }
        match integer_sign(value) {
            None => issues.push(CellIssue::new(i, "VOIP lines quantity must be an integer")),
            Some(IntegerSign::Negative) => {
                issues.push(CellIssue::new(i, "VOIP lines quantity must be non-negative"))
            }
            Some(IntegerSign::NonNegative) => {}
        }
    }
    issues
}

fn check_business_customer(ctx: &RuleContext<'_>) -> Vec<CellIssue> {
    ctx.values
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_empty() && **v != "0" && **v != "1")
        .map(|(i, _)| CellIssue::new(i, "Business customer must be 0 or 1"))
        .collect()
}

fn check_technology(ctx: &RuleContext<'_>) -> Vec<CellIssue> {
    ctx.values
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_empty() && !is_valid_technology(v))
        .map(|(i, _)| {
            CellIssue::new(
                i,
                format!(
                    "Invalid technology. Must be one of {}",
                    quoted_list(&VALID_TECHNOLOGIES)
                ),
            )
        })
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
