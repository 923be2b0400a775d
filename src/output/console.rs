use crate::report::{AuditVerdict, Report, ReportRow};

/// Render a human-readable audit summary: counts, the rows selected for
/// display (blocked ones flagged), and path rules nothing matched.
pub fn render(report: &Report, rows: &[&ReportRow], verdict: &AuditVerdict) -> String {
    let summary = &report.summary;
    let mut output = String::new();

    output.push_str(&format!(
        "\n  Rule set: {} path rule(s), {} publisher(s), {} hash(es)\n",
        summary.rules_loaded, summary.publishers_loaded, summary.hashes_loaded
    ));
    output.push_str(&format!("  Fingerprint: {}\n", report.rule_set_fingerprint));
    output.push_str(&format!(
        "  {} execution(s), {} unique file(s)\n\n",
        summary.records_processed, summary.unique_files
    ));

    output.push_str(&format!(
        "  allowed by path:      {}\n  allowed by publisher: {}\n  allowed by hash:      {}\n  would be blocked:     {}\n\n",
        summary.allowed_by_path,
        summary.allowed_by_publisher,
        summary.allowed_by_hash,
        summary.blocked
    ));

    if rows.is_empty() {
        output.push_str("  No executions to show.\n\n");
    } else {
        for row in rows {
            let tag = if row.would_be_blocked {
                "[BLOCKED]"
            } else {
                "[ALLOWED]"
            };
            output.push_str(&format!("  {} {}{}\n", tag, row.folder, row.file_name));
            output.push_str(&format!(
                "            host {} user {} publisher {}\n",
                dash_if_empty(&row.hostname),
                dash_if_empty(&row.user),
                dash_if_empty(&row.publisher)
            ));
            if let Some(rule) = &row.matched_path_rule {
                output.push_str(&format!("            rule {}\n", rule));
            }
        }
        output.push('\n');
    }

    let unused: Vec<&str> = report.unused_rules().map(|u| u.rule.as_str()).collect();
    if !unused.is_empty() {
        output.push_str(&format!("  {} path rule(s) matched nothing:\n", unused.len()));
        for rule in unused {
            output.push_str(&format!("    {}\n", rule));
        }
        output.push('\n');
    }

    let status = if verdict.pass { "PASS" } else { "FAIL" };
    output.push_str(&format!(
        "  Result: {} ({} would be blocked{})\n\n",
        status,
        verdict.blocked,
        if verdict.fail_on_blocked {
            ", failing on blocked"
        } else {
            ""
        }
    ));

    output
}

fn dash_if_empty(s: &str) -> &str {
    if s.is_empty() {
        "-"
    } else {
        s
    }
}
