//! Cleaning and shape validation for raw path allow rules.
//!
//! Rules usually arrive pasted from a console or spreadsheet, so they may
//! carry zero-width characters, non-breaking spaces or stray whitespace.
//! A string that does not look like a rule after cleaning is not an error;
//! callers skip it.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Drive-letter (`C:\`) or UNC (`\\`) prefix, then anything, ending in a
/// 1-10 character extension (which may itself use `?`) or a `*` wildcard.
static RULE_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Za-z]:\\|\\\\).*(?:\.[A-Za-z0-9_?]{1,10}|\*)$").unwrap());

/// A cleaned path allow rule in vendor wildcard syntax.
///
/// Only [`PathRule::parse`] constructs one, so holding a `PathRule` means the
/// string passed shape validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PathRule(String);

impl PathRule {
    /// Clean a raw rule string and validate its shape.
    ///
    /// Strips every character outside printable ASCII (`0x20..=0x7E`), trims
    /// surrounding whitespace, then checks the drive/UNC prefix and the
    /// extension-or-wildcard suffix. Returns `None` when the result is not a rule.
    pub fn parse(raw: &str) -> Option<Self> {
        let stripped: String = raw.chars().filter(|c| matches!(c, ' '..='~')).collect();
        let cleaned = stripped.trim();
        if RULE_SHAPE_RE.is_match(cleaned) {
            Some(Self(cleaned.to_string()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Text before the first wildcard token (`*` or `?`).
    pub fn literal_prefix(&self) -> &str {
        match self.0.find(&['*', '?'][..]) {
            Some(pos) => &self.0[..pos],
            None => &self.0,
        }
    }

    /// True when the rule contains no wildcard tokens at all.
    pub fn is_literal(&self) -> bool {
        self.literal_prefix().len() == self.0.len()
    }
}

impl fmt::Display for PathRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PathRule {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
