//! Report building: classify every record, collapse duplicates per file,
//! and order the rows deterministically.

pub mod summary;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::record::ExecutionRecord;
use crate::rules::{classify, Classification, RuleSet};

pub use summary::{AuditVerdict, ReportSummary, RuleUsage};

/// Records are classified in chunks of this size between progress callbacks.
pub const PROGRESS_CHUNK: usize = 10_000;

/// One output row: the originating record joined with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub folder: String,
    pub file_name: String,
    pub hash: String,
    pub publisher: String,
    pub hostname: String,
    pub user: String,
    /// Matching path rule, or `None` when no path rule allows the file.
    pub matched_path_rule: Option<String>,
    #[serde(skip)]
    pub matched_rule_index: Option<usize>,
    pub publisher_allowed: bool,
    pub hash_allowed: bool,
    pub would_be_blocked: bool,
}

impl ReportRow {
    fn new(record: &ExecutionRecord, classification: Classification) -> Self {
        let would_be_blocked = classification.would_be_blocked();
        Self {
            folder: record.folder.clone(),
            file_name: record.file_name.clone(),
            hash: record.hash.clone(),
            publisher: record.publisher.clone(),
            hostname: record.hostname.clone(),
            user: record.user.clone(),
            matched_path_rule: classification.matched_rule.map(|r| r.as_str().to_string()),
            matched_rule_index: classification.matched_rule_index,
            publisher_allowed: classification.publisher_allowed,
            hash_allowed: classification.hash_allowed,
            would_be_blocked,
        }
    }

    fn identity(&self) -> (&str, &str) {
        (&self.folder, &self.file_name)
    }

    fn sort_key(&self) -> (&str, &str, &str) {
        (&self.folder, &self.file_name, &self.hash)
    }
}

/// Deduplicated, sorted audit result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    /// Fingerprint of the rule set the rows were evaluated against.
    pub rule_set_fingerprint: String,
    pub summary: ReportSummary,
    pub rule_usage: Vec<RuleUsage>,
    pub rows: Vec<ReportRow>,
}

impl Report {
    pub fn blocked_rows(&self) -> impl Iterator<Item = &ReportRow> {
        self.rows.iter().filter(|r| r.would_be_blocked)
    }

    pub fn unused_rules(&self) -> impl Iterator<Item = &RuleUsage> {
        self.rule_usage.iter().filter(|u| u.hits == 0)
    }
}

/// Classify `records` against `rules` and build the report.
pub fn build_report(records: &[ExecutionRecord], rules: &RuleSet, parallel: bool) -> Report {
    build_report_with_progress(records, rules, parallel, &|_: usize| {})
}

/// As [`build_report`], calling `progress` with the running count of
/// classified records after every [`PROGRESS_CHUNK`] records.
pub fn build_report_with_progress(
    records: &[ExecutionRecord],
    rules: &RuleSet,
    parallel: bool,
    progress: &(dyn Fn(usize) + Sync),
) -> Report {
    let mut rows = Vec::with_capacity(records.len());
    for chunk in records.chunks(PROGRESS_CHUNK) {
        if parallel {
            rows.par_extend(
                chunk
                    .par_iter()
                    .map(|record| ReportRow::new(record, classify(rules, record))),
            );
        } else {
            rows.extend(
                chunk
                    .iter()
                    .map(|record| ReportRow::new(record, classify(rules, record))),
            );
        }
        progress(rows.len());
    }

    let rows = dedup_sorted(rows);
    tracing::debug!(
        records = records.len(),
        unique_files = rows.len(),
        "execution records classified"
    );

    let summary = ReportSummary::new(records.len(), &rows, rules);
    let rule_usage = RuleUsage::collect(&rows, rules);

    Report {
        generated_at: Utc::now(),
        rule_set_fingerprint: rules.fingerprint().to_string(),
        summary,
        rule_usage,
        rows,
    }
}

/// Stable sort by (folder, file name, hash), then keep the last row of each
/// (folder, file name) run. The output stays sorted by the same key.
pub fn dedup_sorted(mut rows: Vec<ReportRow>) -> Vec<ReportRow> {
    rows.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    let mut kept: Vec<ReportRow> = Vec::with_capacity(rows.len());
    for row in rows {
        match kept.last_mut() {
            Some(last) if last.identity() == row.identity() => *last = row,
            _ => kept.push(row),
        }
    }
    kept
}
