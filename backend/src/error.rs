//! Error types for the subscriber validation run.
//!
//! Only run-aborting failures are errors. Per-cell rule violations are
//! [`crate::models::Finding`]s and never travel through these types.
//!
//! - [`CsvError`] - reading, decoding and tokenizing the input
//! - [`HeaderError`] - required column checks
//! - [`ReportError`] - writing output artifacts
//! - [`RunError`] - top-level orchestration errors
//! - [`ServerError`] - dashboard API errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// CSV Reading Errors
// =============================================================================

/// Errors while reading the input CSV.
#[derive(Debug, Error)]
pub enum CsvError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    IoError(#[from] std::io::Error),

    /// Invalid CSV format.
    #[error("Invalid CSV format: {0}")]
    ParseError(String),

    /// A data row carries more fields than the header.
    #[error("Expected {expected} fields in line {line}, saw {found}")]
    RaggedRow {
        line: u64,
        expected: usize,
        found: usize,
    },

    /// Empty file.
    #[error("CSV file is empty")]
    EmptyFile,

    /// No headers found.
    #[error("No headers found in CSV")]
    NoHeaders,
}

impl From<csv::Error> for CsvError {
    fn from(err: csv::Error) -> Self {
        CsvError::ParseError(err.to_string())
    }
}

// =============================================================================
// Header Errors
// =============================================================================

/// Errors while mapping input headers onto the canonical columns.
#[derive(Debug, Error)]
pub enum HeaderError {
    /// One or more required columns have no case-insensitive match.
    #[error("The following required columns are missing: {}", .0.join(", "))]
    MissingColumns(Vec<String>),
}

// =============================================================================
// Report Errors
// =============================================================================

/// Errors while writing an output artifact.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The artifact could not be written.
    #[error("Error saving {}: {message}", path.display())]
    Save { path: PathBuf, message: String },

    /// The artifact was written but is not on disk afterwards.
    #[error("Failed to save {}. File does not exist.", .0.display())]
    Missing(PathBuf),
}

impl ReportError {
    pub fn save(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        ReportError::Save {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Run Errors (top-level)
// =============================================================================

/// Top-level validation run errors.
///
/// This is the error type returned by [`crate::pipeline::run_validation`].
/// Its `Display` text is what lands in the errors artifact as a run-level
/// finding before the run terminates.
#[derive(Debug, Error)]
pub enum RunError {
    /// The input path does not point at a file.
    #[error("Input file '{}' does not exist.", .0.display())]
    InputNotFound(PathBuf),

    /// Company identifier cannot name an output directory.
    #[error("Invalid company identifier: '{0}'")]
    InvalidCompanyId(String),

    /// Input name has no usable file name component.
    #[error("Invalid input file name: '{0}'")]
    InvalidFileName(String),

    /// Output directory could not be wiped or created.
    #[error("Cannot prepare output directory {}: {source}", path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input could not be read or tokenized.
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] CsvError),

    /// Required columns are missing.
    #[error("{0}")]
    Header(#[from] HeaderError),

    /// An artifact could not be written.
    #[error("{0}")]
    Report(#[from] ReportError),
}

// =============================================================================
// Server Errors
// =============================================================================

/// Dashboard API errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Validation run error.
    #[error("Run error: {0}")]
    Run(#[from] RunError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Server internal error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for header operations.
pub type HeaderResult<T> = Result<T, HeaderError>;

/// Result type for artifact writers.
pub type ReportResult<T> = Result<T, ReportError>;

/// Result type for validation runs.
pub type RunResult<T> = Result<T, RunError>;
