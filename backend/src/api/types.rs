//! REST API types for the validation dashboard.
//!
//! Findings are sent in the same order and with the same labels as the
//! errors CSV, so the dashboard table matches the file on disk.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::headers::HeaderIssue;
use crate::models::Finding;
use crate::pipeline::{RunOutcome, RunSummary};
use crate::report::sorted_findings;

/// Response to `POST /api/validate`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub job_id: String,

    /// "clean" or "findings"
    pub status: String,

    pub validated_at: DateTime<Utc>,

    pub summary: RunSummary,

    /// One entry per finding, sorted by error message
    pub findings: Vec<FindingRow>,
}

/// One line of the dashboard's error table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindingRow {
    pub row: String,
    pub column: String,
    pub error: String,
    pub value: String,
}

impl From<&Finding> for FindingRow {
    fn from(finding: &Finding) -> Self {
        Self {
            row: finding.row_label(),
            column: finding.column_label().to_string(),
            error: finding.message.clone(),
            value: finding.value_label().to_string(),
        }
    }
}

impl From<&RunOutcome> for ValidateResponse {
    fn from(outcome: &RunOutcome) -> Self {
        let findings: Vec<FindingRow> = sorted_findings(&outcome.report.findings)
            .into_iter()
            .map(FindingRow::from)
            .collect();

        ValidateResponse {
            job_id: Uuid::new_v4().to_string(),
            status: if findings.is_empty() { "clean" } else { "findings" }.to_string(),
            validated_at: Utc::now(),
            summary: outcome.summary.clone(),
            findings,
        }
    }
}

/// Response to `POST /api/headers`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderCheckResponse {
    pub job_id: String,

    /// "ok" or "issues"
    pub status: String,

    pub file_name: Option<String>,
    pub headers: Vec<String>,
    pub issues: Vec<HeaderIssue>,
}

impl HeaderCheckResponse {
    pub fn new(file_name: Option<String>, headers: Vec<String>, issues: Vec<HeaderIssue>) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            status: if issues.is_empty() { "ok" } else { "issues" }.to_string(),
            file_name,
            headers,
            issues,
        }
    }
}

/// Create an error response
pub fn error_response(error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "error": error,
        "findings": []
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, FlagOverlay};
    use crate::pipeline::ArtifactPaths;
    use crate::validation::ValidationReport;
    use std::path::Path;

    fn outcome(findings: Vec<Finding>) -> RunOutcome {
        RunOutcome {
            summary: RunSummary {
                company_id: "ACME".into(),
                encoding: "utf-8".into(),
                rows: 2,
                findings: findings.len(),
                flagged_cells: findings.len(),
                artifacts: ArtifactPaths::new(Path::new("out"), "ACME", "subs.csv", "xlsx"),
            },
            report: ValidationReport {
                findings,
                flags: FlagOverlay::new(),
            },
        }
    }

    #[test]
    fn test_validate_response_sorted_and_camel_case() {
        let response = ValidateResponse::from(&outcome(vec![
            Finding::cell(2, Column::Zip, "Invalid ZIP code format. Must be 12345 or 12345-6789", "1"),
            Finding::cell(1, Column::Lat, "Latitude must be between -90 and 90", "91"),
        ]));
        assert_eq!(response.status, "findings");
        assert_eq!(response.findings[0].column, "zip");
        assert_eq!(response.findings[1].row, "1");

        let json = serde_json::to_value(&response).unwrap();
        assert!(json["jobId"].is_string());
        assert!(json["validatedAt"].is_string());
        assert_eq!(json["summary"]["companyId"], "ACME");
        assert_eq!(json["findings"][1]["error"], "Latitude must be between -90 and 90");
    }

    #[test]
    fn test_clean_status() {
        let response = ValidateResponse::from(&outcome(vec![]));
        assert_eq!(response.status, "clean");
        assert!(response.findings.is_empty());
    }

    #[test]
    fn test_header_check_status() {
        let ok = HeaderCheckResponse::new(None, vec!["customer".into()], vec![]);
        assert_eq!(ok.status, "ok");

        let issues = crate::headers::precheck_headers(&["Customer".to_string()]);
        let bad = HeaderCheckResponse::new(Some("subs.csv".into()), vec!["Customer".into()], issues);
        assert_eq!(bad.status, "issues");
    }

    #[test]
    fn test_error_response_shape() {
        let value = error_response("File must be a CSV");
        assert_eq!(value["status"], "error");
        assert_eq!(value["error"], "File must be a CSV");
        assert!(value["findings"].as_array().unwrap().is_empty());
    }
}
