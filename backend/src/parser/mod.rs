//! CSV reader with encoding auto-detection.
//!
//! Turns raw input bytes into a header row plus string rows. No subscriber
//! rules here; the only interpretation applied is folding the tabular
//! missing-value markers (`NA`, `NULL`, `NaN`, ...) to empty strings.

use std::path::Path;

use crate::error::{CsvError, CsvResult};

/// Cell texts read as a missing value.
pub const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Column headers, trimmed, in input order
    pub headers: Vec<String>,
    /// Data rows, each exactly `headers.len()` cells long
    pub rows: Vec<Vec<String>>,
    /// Detected encoding
    pub encoding: String,
}

impl ParseResult {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let text = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        // UTF-8 and anything unrecognized: lossy UTF-8
        _ => String::from_utf8_lossy(bytes).into_owned(),
    };
    match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    }
}

/// Fold a missing-value marker to the empty string.
pub fn normalize_missing(cell: &str) -> String {
    if MISSING_MARKERS.contains(&cell) {
        String::new()
    } else {
        cell.to_string()
    }
}

/// Parse decoded CSV text.
///
/// Empty lines are skipped, short rows are padded with missing values and a
/// row wider than the header is rejected.
pub fn parse_str(content: &str, encoding: impl Into<String>) -> CsvResult<ParseResult> {
    if content.trim().is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(CsvError::NoHeaders);
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() > headers.len() {
            return Err(CsvError::RaggedRow {
                line,
                expected: headers.len(),
                found: record.len(),
            });
        }

        let mut row: Vec<String> = record.iter().map(normalize_missing).collect();
        row.resize(headers.len(), String::new());
        rows.push(row);
    }

    Ok(ParseResult {
        headers,
        rows,
        encoding: encoding.into(),
    })
}

/// Parse CSV bytes with encoding auto-detection.
pub fn parse_bytes_auto(bytes: &[u8]) -> CsvResult<ParseResult> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    parse_str(&content, encoding)
}

/// Parse a CSV file with encoding auto-detection.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    let bytes = std::fs::read(path.as_ref())?;
    parse_bytes_auto(&bytes)
}
