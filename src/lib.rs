//! allowaudit: application allowlisting audit.
//!
//! Replays a historical execution log against the active allow policy
//! (path rules in vendor wildcard syntax, code-signing publishers, and
//! SHA-256 file hashes) and reports every file that would have been blocked.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::path::PathBuf;
//! use allowaudit::{audit, AuditInputs, AuditOptions};
//!
//! let inputs = AuditInputs {
//!     path_rules: PathBuf::from("path_rules.txt"),
//!     publishers: Some(PathBuf::from("publishers.txt")),
//!     hashes: None,
//!     execution_log: PathBuf::from("executions.csv"),
//! };
//! let result = audit(&inputs, &AuditOptions::default()).unwrap();
//! println!("Blocked: {}", result.report.summary.blocked);
//! ```

pub mod config;
pub mod error;
pub mod output;
pub mod record;
pub mod report;
pub mod rules;
pub mod source;

use std::path::PathBuf;

use config::Config;
use error::Result;
use output::OutputFormat;
use record::ExecutionRecord;
use report::{AuditVerdict, Report};
use rules::RuleSet;

/// Where the audit reads its inputs from.
#[derive(Debug, Clone)]
pub struct AuditInputs {
    /// Newline-separated path allow rules.
    pub path_rules: PathBuf,
    /// Newline-separated allowed publishers.
    pub publishers: Option<PathBuf>,
    /// Newline-separated allowed SHA-256 hashes.
    pub hashes: Option<PathBuf>,
    /// Execution log (CSV, TSV, JSON or JSON lines).
    pub execution_log: PathBuf,
}

/// Options for an audit invocation.
#[derive(Debug, Clone)]
pub struct AuditOptions {
    /// Path to config file (defaults to `.allowaudit.toml` in the working directory).
    pub config_path: Option<PathBuf>,
    /// Format [`render_report`] renders in.
    pub format: OutputFormat,
    /// CLI override for `report.only_blocked`.
    pub only_blocked_override: Option<bool>,
    /// CLI override for `report.fail_on_blocked`.
    pub fail_on_blocked_override: Option<bool>,
    /// CLI override for `audit.parallel`.
    pub parallel_override: Option<bool>,
}

impl Default for AuditOptions {
    fn default() -> Self {
        Self {
            config_path: None,
            format: OutputFormat::Console,
            only_blocked_override: None,
            fail_on_blocked_override: None,
            parallel_override: None,
        }
    }
}

/// Complete audit result.
#[derive(Debug)]
pub struct AuditReport {
    pub report: Report,
    pub verdict: AuditVerdict,
    /// Whether rendering should leave out allowed rows.
    pub only_blocked: bool,
    pub format: OutputFormat,
}

/// Run a complete audit: load config and inputs, build the rule set,
/// classify the execution log, evaluate the verdict.
pub fn audit(inputs: &AuditInputs, options: &AuditOptions) -> Result<AuditReport> {
    // Load config
    let mut config = match &options.config_path {
        Some(path) => Config::load_required(path)?,
        None => Config::load(&PathBuf::from(".allowaudit.toml"))?,
    };

    // Apply CLI overrides
    if let Some(only_blocked) = options.only_blocked_override {
        config.report.only_blocked = only_blocked;
    }
    if let Some(fail_on_blocked) = options.fail_on_blocked_override {
        config.report.fail_on_blocked = fail_on_blocked;
    }
    if let Some(parallel) = options.parallel_override {
        config.audit.parallel = parallel;
    }

    // Load allow lists and build the rule set
    let path_rules = source::lists::load_path_rules(&inputs.path_rules)?;
    let publishers = match &inputs.publishers {
        Some(path) => source::lists::load_publishers(path)?,
        None => Vec::new(),
    };
    let hashes = match &inputs.hashes {
        Some(path) => source::lists::load_hashes(path)?,
        None => Vec::new(),
    };
    let rules = RuleSet::new(
        path_rules.rules,
        publishers,
        hashes,
        config.audit.case_insensitive_paths,
    );

    // Load the execution log and classify
    let records = source::auto_detect_and_load(&inputs.execution_log)?;
    let mut result = run_audit(&rules, &records, &config);
    result.format = options.format;
    Ok(result)
}

/// Classify already-loaded records against a rule set under `config`.
///
/// The result renders as console text; set `format` to change that.
pub fn run_audit(rules: &RuleSet, records: &[ExecutionRecord], config: &Config) -> AuditReport {
    let report = report::build_report_with_progress(
        records,
        rules,
        config.audit.parallel,
        &|done: usize| tracing::debug!(done, total = records.len(), "classification progress"),
    );
    let verdict = AuditVerdict::evaluate(&report, config.report.fail_on_blocked);

    AuditReport {
        report,
        verdict,
        only_blocked: config.report.only_blocked,
        format: OutputFormat::Console,
    }
}

/// Render an audit report in the format it was requested in.
pub fn render_report(result: &AuditReport) -> Result<String> {
    output::render(
        &result.report,
        &result.verdict,
        result.format,
        result.only_blocked,
    )
}

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::path::Path;

    const FIXTURES: &str = "tests/fixtures/basic";

    fn inputs(log: &str) -> AuditInputs {
        let dir = Path::new(FIXTURES);
        AuditInputs {
            path_rules: dir.join("path_rules.txt"),
            publishers: Some(dir.join("publishers.txt")),
            hashes: Some(dir.join("hashes.txt")),
            execution_log: dir.join(log),
        }
    }

    fn row<'a>(result: &'a AuditReport, file_name: &str) -> &'a report::ReportRow {
        result
            .report
            .rows
            .iter()
            .find(|r| r.file_name == file_name)
            .unwrap()
    }

    #[test]
    fn csv_log_end_to_end() {
        let result = audit(&inputs("executions.csv"), &AuditOptions::default()).unwrap();

        let app = row(&result, "app.exe");
        assert_eq!(app.matched_path_rule.as_deref(), Some(r"C:\Program Files\*"));
        assert!(!app.would_be_blocked);

        let dl3 = row(&result, "x.dll");
        assert_eq!(
            dl3.matched_path_rule.as_deref(),
            Some(r"C:\Users\*\AppData\Local\assembly\dl3\????????.???\*")
        );

        let signed = row(&result, "teams.exe");
        assert!(signed.matched_path_rule.is_none());
        assert!(signed.publisher_allowed);
        assert!(!signed.would_be_blocked);

        let hashed = row(&result, "tool.exe");
        assert!(hashed.hash_allowed);
        assert!(!hashed.would_be_blocked);

        let blocked = row(&result, "payload.exe");
        assert!(blocked.would_be_blocked);

        assert_eq!(result.report.summary.records_processed, 7);
        assert_eq!(result.report.summary.unique_files, 5);
        assert_eq!(result.report.summary.blocked, 1);
        assert!(result.verdict.pass);
    }

    #[test]
    fn report_rows_strictly_ascending() {
        let result = audit(&inputs("executions.csv"), &AuditOptions::default()).unwrap();
        let keys: Vec<(&str, &str, &str)> = result
            .report
            .rows
            .iter()
            .map(|r| (r.folder.as_str(), r.file_name.as_str(), r.hash.as_str()))
            .collect();
        assert!(keys.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn json_lines_log_matches_csv_log() {
        let csv = audit(&inputs("executions.csv"), &AuditOptions::default()).unwrap();
        let jsonl = audit(&inputs("executions.jsonl"), &AuditOptions::default()).unwrap();
        assert_eq!(csv.report.rows, jsonl.report.rows);
        assert_eq!(
            csv.report.rule_set_fingerprint,
            jsonl.report.rule_set_fingerprint
        );
    }

    #[test]
    fn fail_on_blocked_override_fails_verdict() {
        let options = AuditOptions {
            format: OutputFormat::Csv,
            fail_on_blocked_override: Some(true),
            only_blocked_override: Some(true),
            ..Default::default()
        };
        let result = audit(&inputs("executions.csv"), &options).unwrap();
        assert!(!result.verdict.pass);

        let csv = render_report(&result).unwrap();
        assert_eq!(csv.lines().count(), 2);
        assert!(csv.contains("payload.exe"));
    }

    #[test]
    fn requested_format_drives_rendering() {
        let options = AuditOptions {
            format: OutputFormat::Tsv,
            ..Default::default()
        };
        let result = audit(&inputs("executions.csv"), &options).unwrap();
        assert_eq!(result.format, OutputFormat::Tsv);

        let tsv = render_report(&result).unwrap();
        assert!(tsv.starts_with("folder\tfile_name\thash\t"));
        assert_eq!(tsv.lines().count(), 6);

        let default = audit(&inputs("executions.csv"), &AuditOptions::default()).unwrap();
        let console = render_report(&default).unwrap();
        assert!(!console.starts_with("folder"));
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let options = AuditOptions {
            config_path: Some(PathBuf::from("tests/fixtures/basic/absent.toml")),
            ..Default::default()
        };
        assert!(audit(&inputs("executions.csv"), &options).is_err());
    }
}
