use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::report::{AuditVerdict, Report, ReportRow, ReportSummary, RuleUsage};

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: &'a DateTime<Utc>,
    rule_set_fingerprint: &'a str,
    verdict: &'a AuditVerdict,
    summary: &'a ReportSummary,
    rule_usage: &'a [RuleUsage],
    rows: &'a [&'a ReportRow],
}

/// Render the report as pretty-printed JSON.
pub fn render(report: &Report, rows: &[&ReportRow], verdict: &AuditVerdict) -> Result<String> {
    let json = JsonReport {
        generated_at: &report.generated_at,
        rule_set_fingerprint: &report.rule_set_fingerprint,
        verdict,
        summary: &report.summary,
        rule_usage: &report.rule_usage,
        rows,
    };
    Ok(serde_json::to_string_pretty(&json)?)
}
