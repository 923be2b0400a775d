//! Translation of vendor wildcard syntax into anchored regex matchers.
//!
//! Three tokens are recognized, longest first:
//!
//! | token | meaning                                   | regex     |
//! |-------|-------------------------------------------|-----------|
//! | `**`  | any run of characters, `\` included       | `.*`      |
//! | `*`   | any run of characters except `\`          | `[^\\]*`  |
//! | `?`   | exactly one character                     | `.`       |
//!
//! Every other character is escaped, so `.`, `(`, `$`, `+` and friends in
//! folder names stay literal. The regex is built with `.` matching line
//! breaks, so `**` and `?` accept `\n` just as `*` does.

use regex::{Regex, RegexBuilder};

use super::PathRule;
use crate::error::{AuditError, Result};

const DOUBLE_WILDCARD: &str = ".*";
const SINGLE_WILDCARD: &str = r"[^\\]*";
const SINGLE_CHAR: &str = ".";

/// A path rule together with its compiled, fully-anchored matcher.
#[derive(Debug, Clone)]
pub struct CompiledPathMatcher {
    index: usize,
    rule: PathRule,
    regex: Regex,
}

impl CompiledPathMatcher {
    /// Compile `rule`, remembering `index` as its position in the source rule list.
    pub fn compile(index: usize, rule: PathRule, case_insensitive: bool) -> Result<Self> {
        let pattern = translate(rule.as_str());
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(case_insensitive)
            .dot_matches_new_line(true)
            .build()
            .map_err(|e| AuditError::Rule {
                rule: rule.to_string(),
                message: e.to_string(),
            })?;
        Ok(Self { index, rule, regex })
    }

    /// Position of the rule in the source list; lower wins.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn rule(&self) -> &PathRule {
        &self.rule
    }

    /// The generated regex source.
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Whole-string match of `candidate` against the rule.
    pub fn is_match(&self, candidate: &str) -> bool {
        self.regex.is_match(candidate)
    }
}

/// Translate vendor wildcard syntax into an anchored regex source string.
pub fn translate(rule: &str) -> String {
    let mut out = String::with_capacity(rule.len() * 2 + 8);
    out.push_str("^(?:");

    let mut literal_start = 0;
    let mut rest = rule;
    let mut consumed = 0;
    while let Some(ch) = rest.chars().next() {
        let token = if rest.starts_with("**") {
            Some(("**", DOUBLE_WILDCARD))
        } else if ch == '*' {
            Some(("*", SINGLE_WILDCARD))
        } else if ch == '?' {
            Some(("?", SINGLE_CHAR))
        } else {
            None
        };

        match token {
            Some((text, expansion)) => {
                out.push_str(&regex::escape(&rule[literal_start..consumed]));
                out.push_str(expansion);
                consumed += text.len();
                literal_start = consumed;
            }
            None => consumed += ch.len_utf8(),
        }
        rest = &rule[consumed..];
    }
    out.push_str(&regex::escape(&rule[literal_start..]));

    out.push_str(")$");
    out
}
