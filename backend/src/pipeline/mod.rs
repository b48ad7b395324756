//! Validation run orchestration.
//!
//! One run takes an input CSV and a company identifier and leaves four
//! artifacts in `<output_root>/<company_id>/`:
//!
//! 1. a verbatim copy of the input,
//! 2. `<base>_Mod_1.csv`, the cleaned table,
//! 3. `<base>_Errors.csv`, every finding sorted by message,
//! 4. `<base>_Corrected_Subscribers.xlsx`, the cleaned table with flagged cells filled.
//!
//! Stages run in a fixed order (see [`RunStage`]). Once the output
//! directory exists, any failure writes the findings gathered so far plus
//! a run-level finding to the errors artifact before the error is returned.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::path::Path;
//! use subval::pipeline::{run_validation, RunOptions};
//!
//! let outcome = run_validation(Path::new("subscribers.csv"), "ACME", &RunOptions::default())?;
//! println!("{} findings", outcome.summary.findings);
//! ```

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::api::logs::{log_error, log_info, log_info_indent, log_success, log_warning};
use crate::config::Settings;
use crate::error::{CsvError, ReportError, RunError, RunResult};
use crate::headers::{normalize_headers, number_rows};
use crate::models::Finding;
use crate::parser::{parse_bytes_auto, ParseResult};
use crate::report::{write_cleaned_csv, write_errors_csv, AnnotatedSheetWriter, XlsxAnnotatedWriter};
use crate::validation::{validate_table, ValidationReport};

/// Steps of a run, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStage {
    Init,
    CopyOriginal,
    ParseCsv,
    InjectRowNum,
    NormalizeHeaders,
    RunColumnRules,
    WriteCleanedCsv,
    WriteErrorsCsv,
    WriteAnnotatedSheet,
    Done,
    Failed(String),
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunStage::Init => f.write_str("Preparing output directory"),
            RunStage::CopyOriginal => f.write_str("Copying original file"),
            RunStage::ParseCsv => f.write_str("Reading CSV"),
            RunStage::InjectRowNum => f.write_str("Numbering rows"),
            RunStage::NormalizeHeaders => f.write_str("Normalizing headers"),
            RunStage::RunColumnRules => f.write_str("Running column rules"),
            RunStage::WriteCleanedCsv => f.write_str("Writing cleaned CSV"),
            RunStage::WriteErrorsCsv => f.write_str("Writing errors CSV"),
            RunStage::WriteAnnotatedSheet => f.write_str("Writing corrected workbook"),
            RunStage::Done => f.write_str("Done"),
            RunStage::Failed(reason) => write!(f, "Failed: {reason}"),
        }
    }
}

/// Options for a validation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Directory holding the per-company output directories
    pub output_root: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            output_root: PathBuf::from("."),
        }
    }
}

impl From<&Settings> for RunOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            output_root: settings.output_root.clone(),
        }
    }
}

/// Locations of the artifacts of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactPaths {
    pub dir: PathBuf,
    pub original: PathBuf,
    pub cleaned: PathBuf,
    pub errors: PathBuf,
    pub annotated: PathBuf,
}

impl ArtifactPaths {
    /// `file_name` must be a bare file name; `annotated_ext` has no dot.
    pub fn new(output_root: &Path, company_id: &str, file_name: &str, annotated_ext: &str) -> Self {
        let dir = output_root.join(company_id);
        let base = Path::new(file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| file_name.to_string());
        Self {
            original: dir.join(file_name),
            cleaned: dir.join(format!("{base}_Mod_1.csv")),
            errors: dir.join(format!("{base}_Errors.csv")),
            annotated: dir.join(format!("{base}_Corrected_Subscribers.{annotated_ext}")),
            dir,
        }
    }
}

/// Counts and artifact locations of a completed run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub company_id: String,
    pub encoding: String,
    pub rows: usize,
    pub findings: usize,
    pub flagged_cells: usize,
    pub artifacts: ArtifactPaths,
}

/// Everything a completed run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub summary: RunSummary,
    pub report: ValidationReport,
}

/// A company identifier names a single directory under the output root.
pub fn validate_company_id(company_id: &str) -> RunResult<()> {
    let invalid = company_id.trim().is_empty()
        || company_id == "."
        || company_id == ".."
        || company_id.contains(['/', '\\', '\0']);
    if invalid {
        return Err(RunError::InvalidCompanyId(company_id.to_string()));
    }
    Ok(())
}

/// Validate the CSV file at `input`.
pub fn run_validation(input: &Path, company_id: &str, options: &RunOptions) -> RunResult<RunOutcome> {
    validate_company_id(company_id)?;
    if !input.is_file() {
        return Err(RunError::InputNotFound(input.to_path_buf()));
    }
    let file_name = input
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| RunError::InvalidFileName(input.display().to_string()))?;

    // Read before the output directory is wiped: the input may live inside it
    let bytes = fs::read(input).map_err(CsvError::from)?;
    run_validation_bytes(file_name, &bytes, company_id, options)
}

/// Validate CSV content received under `file_name` (e.g. an upload).
pub fn run_validation_bytes(
    file_name: &str,
    bytes: &[u8],
    company_id: &str,
    options: &RunOptions,
) -> RunResult<RunOutcome> {
    run_with_writer(file_name, bytes, company_id, options, &XlsxAnnotatedWriter::new())
}

/// Validate CSV content, rendering the corrected copy with `writer`.
pub fn run_with_writer(
    file_name: &str,
    bytes: &[u8],
    company_id: &str,
    options: &RunOptions,
    writer: &dyn AnnotatedSheetWriter,
) -> RunResult<RunOutcome> {
    validate_company_id(company_id)?;
    let file_name = Path::new(file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| RunError::InvalidFileName(file_name.to_string()))?;

    log_info(format!("📄 Validating {file_name} for {company_id}"));

    let paths = ArtifactPaths::new(&options.output_root, company_id, file_name, writer.extension());
    let mut run = ValidationRun::new(company_id, paths);

    run.enter(RunStage::Init);
    prepare_output_dir(&run.paths.dir)?;

    match run.execute(bytes, writer) {
        Ok(outcome) => Ok(outcome),
        Err(err) => Err(run.fail(err)),
    }
}

/// Wipe and recreate a company's output directory.
fn prepare_output_dir(dir: &Path) -> RunResult<()> {
    let io_err = |source| RunError::OutputDir {
        path: dir.to_path_buf(),
        source,
    };
    if dir.exists() {
        fs::remove_dir_all(dir).map_err(io_err)?;
    }
    fs::create_dir_all(dir).map_err(io_err)
}

/// State of one run in progress.
struct ValidationRun<'a> {
    company_id: &'a str,
    paths: ArtifactPaths,
    stage: RunStage,
    findings: Vec<Finding>,
}

impl<'a> ValidationRun<'a> {
    fn new(company_id: &'a str, paths: ArtifactPaths) -> Self {
        Self {
            company_id,
            paths,
            stage: RunStage::Init,
            findings: Vec::new(),
        }
    }

    fn enter(&mut self, stage: RunStage) {
        log_info_indent(stage.to_string(), 1);
        self.stage = stage;
    }

    fn execute(&mut self, bytes: &[u8], writer: &dyn AnnotatedSheetWriter) -> RunResult<RunOutcome> {
        self.enter(RunStage::CopyOriginal);
        fs::write(&self.paths.original, bytes)
            .map_err(|e| ReportError::save(&self.paths.original, e))?;

        self.enter(RunStage::ParseCsv);
        let ParseResult {
            headers,
            rows,
            encoding,
        } = parse_bytes_auto(bytes)?;
        log_success(format!("Detected encoding: {encoding}"));
        log_success(format!("Read {} rows, {} columns", rows.len(), headers.len()));

        self.enter(RunStage::InjectRowNum);
        let numbered = number_rows(rows);

        self.enter(RunStage::NormalizeHeaders);
        let table = normalize_headers(&headers, &numbered)?;
        drop(numbered);

        self.enter(RunStage::RunColumnRules);
        let report = validate_table(&table);
        self.findings = report.findings.clone();
        if report.is_clean() {
            log_success("No findings");
        } else {
            log_warning(format!(
                "{} findings in {} cells",
                report.findings.len(),
                report.flags.len()
            ));
        }

        self.enter(RunStage::WriteCleanedCsv);
        write_cleaned_csv(&self.paths.cleaned, &table)?;

        self.enter(RunStage::WriteErrorsCsv);
        write_errors_csv(&self.paths.errors, &report.findings)?;

        self.enter(RunStage::WriteAnnotatedSheet);
        writer.write(&self.paths.annotated, &table, &report.flags)?;

        self.enter(RunStage::Done);
        let summary = RunSummary {
            company_id: self.company_id.to_string(),
            encoding,
            rows: table.len(),
            findings: report.findings.len(),
            flagged_cells: report.flags.len(),
            artifacts: self.paths.clone(),
        };
        log_summary(&summary);

        Ok(RunOutcome { summary, report })
    }

    /// Record the failure in the errors artifact and hand the error back.
    fn fail(&mut self, err: RunError) -> RunError {
        let reason = err.to_string();
        log_error(format!("{} failed: {reason}", self.stage));
        self.stage = RunStage::Failed(reason.clone());

        self.findings.push(Finding::run_level(reason));
        match write_errors_csv(&self.paths.errors, &self.findings) {
            Ok(()) => log_info_indent(format!("Errors written to {}", self.paths.errors.display()), 1),
            Err(write_err) => log_error(write_err.to_string()),
        }
        err
    }
}

fn log_summary(summary: &RunSummary) {
    log_success(format!("Validation complete for {}", summary.company_id));
    log_info_indent(format!("Rows:          {}", summary.rows), 1);
    log_info_indent(format!("Findings:      {}", summary.findings), 1);
    log_info_indent(format!("Flagged cells: {}", summary.flagged_cells), 1);
    log_info_indent(format!("Cleaned:       {}", summary.artifacts.cleaned.display()), 1);
    log_info_indent(format!("Errors:        {}", summary.artifacts.errors.display()), 1);
    log_info_indent(format!("Corrected:     {}", summary.artifacts.annotated.display()), 1);
}
