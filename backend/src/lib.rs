//! # Subval - telecom subscriber CSV validation
//!
//! Subval checks subscriber files (one row per broadband subscriber) against
//! a fixed rule set and reports every violation, without changing the data.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌───────────┐   ┌────────────┐   ┌────────────┐   ┌─────────────┐
//! │ CSV File  │──▶│  Parser   │──▶│  Headers   │──▶│ Validation │──▶│  Artifacts  │
//! │(ISO/UTF8) │   │(auto-enc) │   │(OrigRowNum)│   │  (rules)   │   │(csv + xlsx) │
//! └───────────┘   └───────────┘   └────────────┘   └────────────┘   └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use subval::{run_validation, RunOptions};
//!
//! let outcome = run_validation(Path::new("subscribers.csv"), "ACME", &RunOptions::default())?;
//! println!("{} findings in {} rows", outcome.summary.findings, outcome.summary.rows);
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Columns, records, findings and the flag overlay
//! - [`reference`] - State codes, longitude bounds and technologies
//! - [`parser`] - CSV parsing with encoding detection
//! - [`headers`] - Column mapping and header pre-check
//! - [`validation`] - Column rules and the address grammar
//! - [`report`] - Output artifact writers
//! - [`pipeline`] - The validation run
//! - [`config`] - Environment settings
//! - [`api`] - HTTP API server and log streaming

// Core modules
pub mod error;
pub mod models;
pub mod reference;

// Input
pub mod headers;
pub mod parser;

// Rules
pub mod validation;

// Output
pub mod report;

// Orchestration
pub mod config;
pub mod pipeline;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{CsvError, HeaderError, ReportError, RunError, ServerError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Column, Finding, FlagOverlay, Record, SubscriberTable};

// =============================================================================
// Re-exports - Parsing and headers
// =============================================================================

pub use headers::{column_letter, normalize_headers, precheck_headers, ColumnMapping, HeaderIssue};
pub use parser::{decode_content, detect_encoding, parse_bytes_auto, parse_csv_file_auto, ParseResult};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{check_address, match_grammar, validate_table, GrammarOutcome, ValidationReport};

// =============================================================================
// Re-exports - Reports
// =============================================================================

pub use report::{write_cleaned_csv, write_errors_csv, AnnotatedSheetWriter, XlsxAnnotatedWriter};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use config::Settings;
pub use pipeline::{
    run_validation, run_validation_bytes, run_with_writer, ArtifactPaths, RunOptions, RunOutcome,
    RunStage, RunSummary,
};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::types::{error_response, FindingRow, HeaderCheckResponse, ValidateResponse};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
