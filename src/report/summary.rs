use serde::{Deserialize, Serialize};

use super::{Report, ReportRow};
use crate::rules::RuleSet;

/// Aggregate counts for a report.
///
/// The per-mechanism counters are not exclusive: a row allowed by both a
/// path rule and its publisher counts towards both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub records_processed: usize,
    pub unique_files: usize,
    pub blocked: usize,
    pub allowed_by_path: usize,
    pub allowed_by_publisher: usize,
    pub allowed_by_hash: usize,
    pub rules_loaded: usize,
    pub publishers_loaded: usize,
    pub hashes_loaded: usize,
}

impl ReportSummary {
    pub fn new(records_processed: usize, rows: &[ReportRow], rules: &RuleSet) -> Self {
        let count = |pred: fn(&ReportRow) -> bool| rows.iter().filter(|r| pred(r)).count();
        Self {
            records_processed,
            unique_files: rows.len(),
            blocked: count(|r| r.would_be_blocked),
            allowed_by_path: count(|r| r.matched_path_rule.is_some()),
            allowed_by_publisher: count(|r| r.publisher_allowed),
            allowed_by_hash: count(|r| r.hash_allowed),
            rules_loaded: rules.matchers().len(),
            publishers_loaded: rules.publisher_count(),
            hashes_loaded: rules.hash_count(),
        }
    }
}

/// How many report rows a path rule matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleUsage {
    pub index: usize,
    pub rule: String,
    pub hits: usize,
}

impl RuleUsage {
    /// One entry per compiled rule, in source order.
    pub fn collect(rows: &[ReportRow], rules: &RuleSet) -> Vec<Self> {
        let mut usage: Vec<Self> = rules
            .matchers()
            .iter()
            .map(|m| Self {
                index: m.index(),
                rule: m.rule().to_string(),
                hits: 0,
            })
            .collect();

        for index in rows.iter().filter_map(|r| r.matched_rule_index) {
            if let Ok(pos) = usage.binary_search_by_key(&index, |u| u.index) {
                usage[pos].hits += 1;
            }
        }
        usage
    }
}

/// Pass/fail decision for a finished audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditVerdict {
    pub pass: bool,
    pub blocked: usize,
    pub fail_on_blocked: bool,
}

impl AuditVerdict {
    pub fn evaluate(report: &Report, fail_on_blocked: bool) -> Self {
        let blocked = report.summary.blocked;
        Self {
            pass: !(fail_on_blocked && blocked > 0),
            blocked,
            fail_on_blocked,
        }
    }
}
