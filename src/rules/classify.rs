//! Per-record evaluation of the three allow mechanisms.

use serde::{Deserialize, Serialize};

use super::{PathRule, RuleSet};
use crate::record::ExecutionRecord;

/// Verdict for one execution record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// First path rule, in source order, matching `folder + file_name`.
    pub matched_rule: Option<PathRule>,
    /// Source position of `matched_rule`.
    pub matched_rule_index: Option<usize>,
    pub publisher_allowed: bool,
    pub hash_allowed: bool,
}

impl Classification {
    /// True only when no mechanism allows the execution.
    pub fn would_be_blocked(&self) -> bool {
        self.matched_rule.is_none() && !self.publisher_allowed && !self.hash_allowed
    }
}

/// Classify one record. Empty or malformed fields degrade to non-matches.
pub fn classify(rules: &RuleSet, record: &ExecutionRecord) -> Classification {
    let candidate = record.candidate_path();
    let matched = if candidate.is_empty() {
        None
    } else {
        rules.match_path(&candidate)
    };

    Classification {
        matched_rule: matched.map(|m| m.rule().clone()),
        matched_rule_index: matched.map(|m| m.index()),
        publisher_allowed: rules.publisher_allowed(&record.publisher),
        hash_allowed: rules.hash_allowed(&record.hash),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NO_STRINGS: [&str; 0] = [];
    const ALLOWED_HASH: &str = "3f79bb7b435b05321651daefd374cdc681dc06faa65e374e38337b88ca046dea";

    fn record(folder: &str, file_name: &str, publisher: &str, hash: &str) -> ExecutionRecord {
        ExecutionRecord {
            folder: folder.into(),
            file_name: file_name.into(),
            hash: hash.into(),
            publisher: publisher.into(),
            hostname: "WS-01".into(),
            user: "CORP\\alice".into(),
        }
    }

    fn rules() -> RuleSet {
        RuleSet::from_raw(
            [
                r"C:\Program Files\*",
                r"C:\Users\*\AppData\Local\assembly\dl3\????????.???\*",
            ],
            ["Microsoft Corporation"],
            [ALLOWED_HASH.to_uppercase()],
            false,
        )
    }

    #[test]
    fn program_files_rule_allows_direct_child() {
        let c = classify(&rules(), &record(r"C:\Program Files\", "app.exe", "", ""));
        assert_eq!(c.matched_rule.as_ref().unwrap().as_str(), r"C:\Program Files\*");
        assert_eq!(c.matched_rule_index, Some(0));
        assert!(!c.would_be_blocked());
    }

    #[test]
    fn dl3_rule_matches_eight_dot_three_segment() {
        let c = classify(
            &rules(),
            &record(
                r"C:\Users\bob\AppData\Local\assembly\dl3\abcdefgh.tmp\",
                "x.dll",
                "",
                "",
            ),
        );
        assert_eq!(c.matched_rule_index, Some(1));
        assert!(!c.would_be_blocked());
    }

    #[test]
    fn publisher_alone_carries_the_allow() {
        let c = classify(
            &rules(),
            &record(r"C:\Temp\", "setup.exe", "Microsoft Corporation", "00"),
        );
        assert!(c.matched_rule.is_none());
        assert!(c.publisher_allowed);
        assert!(!c.hash_allowed);
        assert!(!c.would_be_blocked());
    }

    #[test]
    fn hash_alone_carries_the_allow() {
        let c = classify(&rules(), &record(r"C:\Temp\", "setup.exe", "", ALLOWED_HASH));
        assert!(c.hash_allowed);
        assert!(!c.would_be_blocked());
    }

    #[test]
    fn nothing_matches_means_blocked() {
        let c = classify(
            &rules(),
            &record(r"C:\Temp\", "evil.exe", "Unknown Vendor", "deadbeef"),
        );
        assert_eq!(
            c,
            Classification {
                matched_rule: None,
                matched_rule_index: None,
                publisher_allowed: false,
                hash_allowed: false,
            }
        );
        assert!(c.would_be_blocked());
    }

    #[test]
    fn empty_record_is_blocked_not_an_error() {
        let c = classify(&rules(), &ExecutionRecord::default());
        assert!(c.would_be_blocked());
    }

    #[test]
    fn empty_rule_set_blocks_everything() {
        let empty = RuleSet::from_raw(NO_STRINGS, NO_STRINGS, NO_STRINGS, false);
        let c = classify(&empty, &record(r"C:\Program Files\", "app.exe", "X", "Y"));
        assert!(c.would_be_blocked());
    }

    #[test]
    fn reclassifying_with_rebuilt_rules_is_identical() {
        let r = record(r"C:\Program Files\", "app.exe", "Microsoft Corporation", "");
        assert_eq!(classify(&rules(), &r), classify(&rules(), &r));
    }
}
