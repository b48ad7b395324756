//! End-to-end validation runs against a temporary output root.

use std::collections::BTreeMap;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use regex::Regex;

use subval::error::ReportResult;
use subval::{
    run_validation, run_with_writer, AnnotatedSheetWriter, FlagOverlay, ReportError, RunError,
    RunOptions, SubscriberTable,
};

const HEADER: &str = "customer,lat,lon,address,city,state,zip,download,upload,voip_lines_quantity,business_customer,technology";

fn setup(name: &str, content: &str) -> (tempfile::TempDir, PathBuf, RunOptions) {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join(name);
    fs::write(&input, content).unwrap();
    let options = RunOptions {
        output_root: dir.path().join("out"),
    };
    (dir, input, options)
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn mixed_input() -> String {
    [
        "Notes,Customer,LAT,lon,address,city,state,zip,download,upload,voip_lines_quantity,business_customer,technology",
        "x,CUST1,30.27,-97.74,123 Main St,Austin,TX,78701,100,20,1,0,fiber",
        "y,CUST2,91,-97.74,456 Oak Ave,Austin,TX,78702,100,20,,1,FIBER",
        "z,CUST1,30.27,-97.74,789 Elm Blvd,Austin,TX,78703,100,20,0,0,cable",
    ]
    .join("\n")
}

#[test]
fn test_full_run_writes_all_artifacts() {
    let (_dir, input, options) = setup("subs.csv", &mixed_input());
    let outcome = run_validation(&input, "ACME", &options).unwrap();

    let company_dir = options.output_root.join("ACME");
    assert_eq!(
        listing(&company_dir),
        vec![
            "subs.csv",
            "subs_Corrected_Subscribers.xlsx",
            "subs_Errors.csv",
            "subs_Mod_1.csv",
        ]
    );
    assert_eq!(read(&company_dir.join("subs.csv")), mixed_input());

    assert_eq!(outcome.summary.rows, 3);
    assert_eq!(outcome.summary.findings, 3);
    assert_eq!(outcome.summary.flagged_cells, 3);
}

/// Read one part of the workbook's zip container as text.
fn workbook_part(path: &Path, part: &str) -> String {
    let mut archive = zip::ZipArchive::new(fs::File::open(path).unwrap()).unwrap();
    let mut text = String::new();
    archive.by_name(part).unwrap().read_to_string(&mut text).unwrap();
    text
}

/// Cell reference to style index for every cell in the sheet xml.
fn cell_styles(sheet_xml: &str) -> BTreeMap<String, u32> {
    let cell = Regex::new(r"<c\s([^>]*)>").unwrap();
    let reference = Regex::new(r#"(?:^|\s)r="([A-Z]+[0-9]+)""#).unwrap();
    let style = Regex::new(r#"\ss="([0-9]+)""#).unwrap();

    cell.captures_iter(sheet_xml)
        .map(|c| {
            let attrs = &c[1];
            let r = reference.captures(attrs).unwrap()[1].to_string();
            let s = style
                .captures(attrs)
                .map(|s| s[1].parse().unwrap())
                .unwrap_or(0);
            (r, s)
        })
        .collect()
}

#[test]
fn test_workbook_highlights_only_flagged_cells() {
    let (_dir, input, options) = setup("subs.csv", &mixed_input());
    let outcome = run_validation(&input, "ACME", &options).unwrap();
    let workbook = &outcome.summary.artifacts.annotated;

    let sheet = workbook_part(workbook, "xl/worksheets/sheet1.xml");

    let row_num = Regex::new(r#"<c r="A([0-9]+)"[^>]*><v>([^<]*)</v>"#).unwrap();
    let row_nums: Vec<(String, String)> = row_num
        .captures_iter(&sheet)
        .map(|c| (c[1].to_string(), c[2].to_string()))
        .filter(|(row, _)| row != "1")
        .collect();
    assert_eq!(
        row_nums,
        vec![
            ("2".to_string(), "1".to_string()),
            ("3".to_string(), "2".to_string()),
            ("4".to_string(), "3".to_string()),
        ]
    );

    // Duplicate customers on rows 1 and 3, latitude on row 2
    let styled: Vec<String> = cell_styles(&sheet)
        .into_iter()
        .filter(|(_, s)| *s != 0)
        .map(|(r, _)| r)
        .collect();
    assert_eq!(styled, vec!["B2", "B4", "C3"]);

    let styles = workbook_part(workbook, "xl/styles.xml");
    assert!(styles.contains(r#"patternType="solid""#));
    assert!(styles.contains("FFFFFF00"));
}

#[test]
fn test_cleaned_csv_has_row_numbers_and_canonical_columns() {
    let (_dir, input, options) = setup("subs.csv", &mixed_input());
    let outcome = run_validation(&input, "ACME", &options).unwrap();

    let cleaned = read(&outcome.summary.artifacts.cleaned);
    let lines: Vec<&str> = cleaned.lines().collect();
    assert_eq!(lines[0], format!("OrigRowNum,{HEADER}"));
    assert_eq!(
        lines[1],
        "1,CUST1,30.27,-97.74,123 Main St,Austin,TX,78701,100,20,1,0,fiber"
    );

    let row_nums: Vec<&str> = lines[1..]
        .iter()
        .map(|l| l.split(',').next().unwrap())
        .collect();
    assert_eq!(row_nums, vec!["1", "2", "3"]);
}

#[test]
fn test_errors_csv_sorted_by_message() {
    let (_dir, input, options) = setup("subs.csv", &mixed_input());
    let outcome = run_validation(&input, "ACME", &options).unwrap();

    let errors = read(&outcome.summary.artifacts.errors);
    let lines: Vec<&str> = errors.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Row,Column,Error,Value",
            "1,customer,Duplicate customer ID,CUST1",
            "3,customer,Duplicate customer ID,CUST1",
            "2,lat,Latitude must be between -90 and 90,91",
        ]
    );
}

#[test]
fn test_clean_input_writes_header_only_errors() {
    let content = format!("{HEADER}\nC1,13.45,144.79,100 Marine Corps Dr,Hagatna,GU,96910,50,10,0,1,dsl\n");
    let (_dir, input, options) = setup("guam.csv", &content);
    let outcome = run_validation(&input, "PACIFIC", &options).unwrap();

    assert!(outcome.report.is_clean(), "{:?}", outcome.report.findings);
    assert_eq!(read(&outcome.summary.artifacts.errors), "Row,Column,Error,Value\n");
    assert!(outcome.summary.artifacts.annotated.exists());
}

#[test]
fn test_rerun_is_idempotent_and_purges_leftovers() {
    let (_dir, input, options) = setup("subs.csv", &mixed_input());

    let first = run_validation(&input, "ACME", &options).unwrap();
    let cleaned = fs::read(&first.summary.artifacts.cleaned).unwrap();
    let errors = fs::read(&first.summary.artifacts.errors).unwrap();

    let stale = first.summary.artifacts.dir.join("stale.txt");
    fs::write(&stale, "left over").unwrap();

    let second = run_validation(&input, "ACME", &options).unwrap();
    assert_eq!(fs::read(&second.summary.artifacts.cleaned).unwrap(), cleaned);
    assert_eq!(fs::read(&second.summary.artifacts.errors).unwrap(), errors);
    assert!(!stale.exists());
    assert_eq!(listing(&second.summary.artifacts.dir).len(), 4);
}

#[test]
fn test_missing_column_fails_and_records_run_finding() {
    let content = "customer,lat,lon,address,city,state,download,upload,voip_lines_quantity,business_customer,technology\nC1,1,1,1 Main St,A,TX,1,1,1,1,fiber\n";
    let (_dir, input, options) = setup("subs.csv", content);

    let err = run_validation(&input, "ACME", &options).unwrap_err();
    assert!(matches!(err, RunError::Header(_)));

    let company_dir = options.output_root.join("ACME");
    let errors = read(&company_dir.join("subs_Errors.csv"));
    assert_eq!(
        errors.lines().collect::<Vec<_>>(),
        vec![
            "Row,Column,Error,Value",
            "N/A,N/A,The following required columns are missing: zip,N/A",
        ]
    );
    assert!(company_dir.join("subs.csv").exists());
    assert!(!company_dir.join("subs_Mod_1.csv").exists());
}

#[test]
fn test_unreadable_csv_is_a_run_finding() {
    let content = format!("{HEADER}\nC1,1,1,1 Main St,A,TX,78701,1,1,1,1,fiber,extra\n");
    let (_dir, input, options) = setup("subs.csv", &content);

    let err = run_validation(&input, "ACME", &options).unwrap_err();
    assert!(matches!(err, RunError::Csv(_)));

    let errors = read(&options.output_root.join("ACME").join("subs_Errors.csv"));
    assert!(errors.contains("Failed to read CSV: Expected 12 fields"));
}

#[test]
fn test_input_inside_output_dir_survives_wipe() {
    let dir = tempfile::tempdir().unwrap();
    let company_dir = dir.path().join("ACME");
    fs::create_dir_all(&company_dir).unwrap();
    let input = company_dir.join("subs.csv");
    fs::write(&input, mixed_input()).unwrap();

    let options = RunOptions {
        output_root: dir.path().to_path_buf(),
    };
    run_validation(&input, "ACME", &options).unwrap();
    assert_eq!(read(&input), mixed_input());
}

/// Dumps the overlay as text so the flagged cells can be asserted.
struct FlagOverlayProbe;

impl AnnotatedSheetWriter for FlagOverlayProbe {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn write(&self, path: &Path, table: &SubscriberTable, flags: &FlagOverlay) -> ReportResult<()> {
        let lines: Vec<String> = flags
            .iter()
            .map(|(row, column, message)| format!("{row}|{column}|{message}"))
            .collect();
        fs::write(path, format!("{}\n{}", table.len(), lines.join("\n")))
            .map_err(|e| ReportError::save(path, e))
    }
}

struct FailingWriter;

impl AnnotatedSheetWriter for FailingWriter {
    fn extension(&self) -> &'static str {
        "xlsx"
    }

    fn write(&self, path: &Path, _table: &SubscriberTable, _flags: &FlagOverlay) -> ReportResult<()> {
        Err(ReportError::save(path, "disk full"))
    }
}

#[test]
fn test_annotated_writer_receives_last_message_per_cell() {
    let content = format!("{HEADER}\n\"A,B\",1,-97,1 Main St,Austin,TX,78701,1,1,1,1,fiber\n\"A,B\",1,-97,1 Main St,Austin,TX,78701,1,1,1,1,fiber\n");
    let (_dir, input, options) = setup("subs.csv", &content);
    let bytes = fs::read(&input).unwrap();

    let outcome = run_with_writer("subs.csv", &bytes, "ACME", &options, &FlagOverlayProbe).unwrap();
    assert_eq!(outcome.summary.findings, 4);

    let dump = read(&outcome.summary.artifacts.annotated);
    assert!(outcome
        .summary
        .artifacts
        .annotated
        .ends_with("subs_Corrected_Subscribers.txt"));
    assert_eq!(
        dump,
        "2\n1|customer|Duplicate customer ID\n2|customer|Duplicate customer ID"
    );
}

#[test]
fn test_annotated_write_failure_keeps_findings() {
    let (_dir, input, options) = setup("subs.csv", &mixed_input());
    let bytes = fs::read(&input).unwrap();

    let err = run_with_writer("subs.csv", &bytes, "ACME", &options, &FailingWriter).unwrap_err();
    assert!(matches!(err, RunError::Report(_)));

    let errors = read(&options.output_root.join("ACME").join("subs_Errors.csv"));
    let lines: Vec<&str> = errors.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(lines[1], "1,customer,Duplicate customer ID,CUST1");
    assert!(lines[3].starts_with("N/A,N/A,Error saving"));
    assert!(lines[3].contains("disk full"));
}

#[test]
fn test_invalid_company_id_touches_nothing() {
    let (_dir, input, options) = setup("subs.csv", &mixed_input());
    let err = run_validation(&input, "../escape", &options).unwrap_err();
    assert!(matches!(err, RunError::InvalidCompanyId(_)));
    assert!(!options.output_root.exists());
}
