//! Literal-prefix index over compiled path matchers.
//!
//! A rule can only match a path that starts with the rule's literal prefix
//! (everything before the first wildcard). Each matcher is filed under its
//! anchor, the literal prefix cut after its last `\`. A candidate path then
//! only needs to be tested against the buckets keyed by its own
//! `\`-terminated prefixes, plus the few rules with no anchor at all.
//! Candidates are tested in source order, so the result is identical to a
//! linear first-match scan.

use std::collections::HashMap;

use super::CompiledPathMatcher;

#[derive(Debug, Clone, Default)]
pub struct PrefixIndex {
    buckets: HashMap<String, Vec<usize>>,
    unanchored: Vec<usize>,
    case_insensitive: bool,
}

impl PrefixIndex {
    /// Build the index; positions refer to slots in `matchers`.
    pub fn build(matchers: &[CompiledPathMatcher], case_insensitive: bool) -> Self {
        let mut index = Self {
            case_insensitive,
            ..Self::default()
        };
        for (slot, matcher) in matchers.iter().enumerate() {
            match anchor_of(matcher.rule().literal_prefix()) {
                Some(anchor) => {
                    let key = index.fold(anchor);
                    index.buckets.entry(key).or_default().push(slot);
                }
                None => index.unanchored.push(slot),
            }
        }
        index
    }

    /// Slots of the matchers that could match `candidate`, ascending.
    ///
    /// Returns `None` when the index cannot answer for this candidate and the
    /// caller must fall back to a full scan.
    pub fn candidates(&self, candidate: &str) -> Option<Vec<usize>> {
        if self.case_insensitive && !candidate.is_ascii() {
            return None;
        }

        let mut slots = self.unanchored.clone();
        let folded = self.fold(candidate);
        for (pos, _) in folded.match_indices('\\') {
            if let Some(bucket) = self.buckets.get(&folded[..=pos]) {
                slots.extend_from_slice(bucket);
            }
        }
        slots.sort_unstable();
        Some(slots)
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    fn fold(&self, text: &str) -> String {
        if self.case_insensitive {
            text.to_ascii_lowercase()
        } else {
            text.to_string()
        }
    }
}

/// Literal prefix cut after its last path separator.
fn anchor_of(literal_prefix: &str) -> Option<&str> {
    literal_prefix
        .rfind('\\')
        .map(|pos| &literal_prefix[..=pos])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::PathRule;

    fn compile(rules: &[&str], case_insensitive: bool) -> Vec<CompiledPathMatcher> {
        rules
            .iter()
            .enumerate()
            .map(|(i, r)| {
                CompiledPathMatcher::compile(i, PathRule::parse(r).unwrap(), case_insensitive)
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn anchor_cuts_after_last_separator() {
        assert_eq!(anchor_of(r"C:\Program Files\Ven"), Some(r"C:\Program Files\"));
        assert_eq!(anchor_of(r"\\server\share\"), Some(r"\\server\share\"));
        assert_eq!(anchor_of(""), None);
    }

    #[test]
    fn candidates_come_from_matching_buckets_in_order() {
        let matchers = compile(
            &[
                r"C:\Windows\*",
                r"D:\Tools\*",
                r"C:\Windows\System32\*",
                r"\\fileserver\*",
                r"C:\*",
            ],
            false,
        );
        let index = PrefixIndex::build(&matchers, false);
        let slots = index.candidates(r"C:\Windows\System32\cmd.exe").unwrap();
        assert_eq!(slots, vec![0, 2, 4]);
    }

    #[test]
    fn case_insensitive_index_folds_ascii() {
        let matchers = compile(&[r"C:\Windows\*"], true);
        let index = PrefixIndex::build(&matchers, true);
        assert_eq!(index.candidates(r"c:\WINDOWS\x.exe").unwrap(), vec![0]);
    }

    #[test]
    fn case_insensitive_non_ascii_candidate_falls_back() {
        let matchers = compile(&[r"C:\Windows\*"], true);
        let index = PrefixIndex::build(&matchers, true);
        assert!(index.candidates("C:\\Windows\\caf\u{e9}.exe").is_none());
    }
}
