//! Output artifacts.
//!
//! Plain CSV writers for the cleaned table and the error list, and the
//! [`AnnotatedSheetWriter`] seam for the highlighted corrected copy. The
//! validation engine only produces a [`FlagOverlay`]; how flags are rendered
//! is up to the sheet writer.

use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatPattern, Workbook};

use crate::error::{ReportError, ReportResult};
use crate::models::{cleaned_header, Column, Finding, FlagOverlay, SubscriberTable};

/// Header of the errors artifact.
pub const ERRORS_HEADER: [&str; 4] = ["Row", "Column", "Error", "Value"];

/// Fill applied to flagged cells.
pub const HIGHLIGHT_RGB: u32 = 0xFFFF00;

// =============================================================================
// CSV
// =============================================================================

fn csv_writer(path: &Path) -> ReportResult<csv::Writer<std::fs::File>> {
    csv::Writer::from_path(path).map_err(|e| ReportError::save(path, e))
}

/// Write the cleaned table: `OrigRowNum` and the 12 canonical columns.
pub fn write_cleaned_csv(path: &Path, table: &SubscriberTable) -> ReportResult<()> {
    let mut writer = csv_writer(path)?;
    writer
        .write_record(cleaned_header())
        .map_err(|e| ReportError::save(path, e))?;
    for record in table.records() {
        writer
            .write_record(record.to_row())
            .map_err(|e| ReportError::save(path, e))?;
    }
    writer.flush().map_err(|e| ReportError::save(path, e))
}

/// Findings ordered by message text. Ties keep their recorded order.
pub fn sorted_findings(findings: &[Finding]) -> Vec<&Finding> {
    let mut sorted: Vec<&Finding> = findings.iter().collect();
    sorted.sort_by(|a, b| a.message.cmp(&b.message));
    sorted
}

/// Write the error list. Always writes the header, even with no findings.
pub fn write_errors_csv(path: &Path, findings: &[Finding]) -> ReportResult<()> {
    let mut writer = csv_writer(path)?;
    writer
        .write_record(ERRORS_HEADER)
        .map_err(|e| ReportError::save(path, e))?;
    for finding in sorted_findings(findings) {
        let row = finding.row_label();
        writer
            .write_record([
                row.as_str(),
                finding.column_label(),
                finding.message.as_str(),
                finding.value_label(),
            ])
            .map_err(|e| ReportError::save(path, e))?;
    }
    writer.flush().map_err(|e| ReportError::save(path, e))
}

// =============================================================================
// Annotated copy
// =============================================================================

/// Renders the cleaned table with flagged cells visually marked.
pub trait AnnotatedSheetWriter {
    /// File extension of the produced artifact, without the dot.
    fn extension(&self) -> &'static str;

    fn write(&self, path: &Path, table: &SubscriberTable, flags: &FlagOverlay) -> ReportResult<()>;
}

/// Excel workbook with a solid fill on every flagged cell.
#[derive(Debug, Clone)]
pub struct XlsxAnnotatedWriter {
    fill: u32,
    sheet_name: String,
}

impl Default for XlsxAnnotatedWriter {
    fn default() -> Self {
        Self {
            fill: HIGHLIGHT_RGB,
            sheet_name: "Subscribers".to_string(),
        }
    }
}

impl XlsxAnnotatedWriter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AnnotatedSheetWriter for XlsxAnnotatedWriter {
    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn write(&self, path: &Path, table: &SubscriberTable, flags: &FlagOverlay) -> ReportResult<()> {
        let save_err = |e: rust_xlsxwriter::XlsxError| ReportError::save(path, e);

        let highlight = Format::new()
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(self.fill));

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(&self.sheet_name).map_err(save_err)?;

        for (col, name) in cleaned_header().iter().enumerate() {
            sheet.write_string(0, col as u16, *name).map_err(save_err)?;
        }

        for (i, record) in table.records().iter().enumerate() {
            let row = i as u32 + 1;
            sheet
                .write_number(row, 0, record.orig_row_num() as f64)
                .map_err(save_err)?;

            for column in Column::ALL {
                let col = column.index() as u16 + 1;
                let value = record.get(column);
                if flags.is_flagged(record.orig_row_num(), column) {
                    sheet
                        .write_string_with_format(row, col, value, &highlight)
                        .map_err(save_err)?;
                } else {
                    sheet.write_string(row, col, value).map_err(save_err)?;
                }
            }
        }

        workbook.save(path).map_err(save_err)?;
        if !path.exists() {
            return Err(ReportError::Missing(path.to_path_buf()));
        }
        Ok(())
    }
}
