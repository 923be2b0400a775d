pub mod console;
pub mod csv;
pub mod json;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::report::{AuditVerdict, Report, ReportRow};

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
    Csv,
    Tsv,
}

impl OutputFormat {
    pub fn from_str_lenient(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "console" | "text" => Some(Self::Console),
            "json" => Some(Self::Json),
            "csv" => Some(Self::Csv),
            "tsv" | "tab" => Some(Self::Tsv),
            _ => None,
        }
    }
}

/// Render a report into the specified format.
///
/// With `only_blocked` set, rows that some mechanism allows are left out;
/// the summary still covers every row.
pub fn render(
    report: &Report,
    verdict: &AuditVerdict,
    format: OutputFormat,
    only_blocked: bool,
) -> Result<String> {
    let rows: Vec<&ReportRow> = report
        .rows
        .iter()
        .filter(|r| !only_blocked || r.would_be_blocked)
        .collect();
    match format {
        OutputFormat::Console => Ok(console::render(report, &rows, verdict)),
        OutputFormat::Json => json::render(report, &rows, verdict),
        OutputFormat::Csv => Ok(csv::render(&rows, ',')),
        OutputFormat::Tsv => Ok(csv::render(&rows, '\t')),
    }
}
