//! Newline-separated allow lists: path rules, publishers and hashes.
//!
//! Blank lines and lines starting with `#` are ignored in every list.

use std::path::Path;

use crate::error::Result;
use crate::rules::PathRule;

/// Path rules read from a list, plus how many lines were not rules.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathRuleList {
    pub rules: Vec<PathRule>,
    pub rejected: usize,
}

pub fn parse_path_rules(text: &str) -> PathRuleList {
    let mut list = PathRuleList::default();
    for line in entries(text) {
        match PathRule::parse(line) {
            Some(rule) => list.rules.push(rule),
            None => {
                tracing::debug!(line = %line.escape_debug(), "not a path rule, skipping");
                list.rejected += 1;
            }
        }
    }
    list
}

pub fn parse_publishers(text: &str) -> Vec<String> {
    entries(text).map(str::to_string).collect()
}

/// Hash entries that decode as 32 bytes of hex; anything else is skipped with a warning.
pub fn parse_hashes(text: &str) -> Vec<String> {
    entries(text)
        .filter(|line| match hex::decode(line) {
            Ok(bytes) if bytes.len() == 32 => true,
            _ => {
                tracing::warn!(hash = %line, "not a SHA-256 hash, skipping");
                false
            }
        })
        .map(str::to_string)
        .collect()
}

pub fn load_path_rules(path: &Path) -> Result<PathRuleList> {
    let list = parse_path_rules(&std::fs::read_to_string(path)?);
    tracing::info!(
        path = %path.display(),
        rules = list.rules.len(),
        rejected = list.rejected,
        "path rules loaded"
    );
    Ok(list)
}

pub fn load_publishers(path: &Path) -> Result<Vec<String>> {
    Ok(parse_publishers(&std::fs::read_to_string(path)?))
}

pub fn load_hashes(path: &Path) -> Result<Vec<String>> {
    Ok(parse_hashes(&std::fs::read_to_string(path)?))
}

fn entries(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(|line| line.trim_start_matches('\u{FEFF}').trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}
