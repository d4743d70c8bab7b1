use super::ReportResult;
use crate::standup::{AnalysisLogEntry, AnalysisResult, SessionSummary};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Machine-readable CLI output
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonReport<T> {
    pub metadata: ReportMetadata,
    pub result: T,
    /// Every provider attempt made while producing `result`
    pub attempts: Vec<AnalysisLogEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub report_generated_at: String,
    pub tool_version: String,
}

impl ReportMetadata {
    fn now() -> Self {
        Self {
            report_generated_at: Utc::now().to_rfc3339(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

pub struct JsonReporter;

impl JsonReporter {
    pub fn analysis(result: &AnalysisResult, attempts: Vec<AnalysisLogEntry>) -> ReportResult<String> {
        render(result, attempts)
    }

    pub fn summary(summary: &SessionSummary, attempts: Vec<AnalysisLogEntry>) -> ReportResult<String> {
        render(summary, attempts)
    }
}

fn render<T: Serialize>(result: &T, attempts: Vec<AnalysisLogEntry>) -> ReportResult<String> {
    let report = JsonReport {
        metadata: ReportMetadata::now(),
        result,
        attempts,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
