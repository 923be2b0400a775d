pub mod classify;
pub mod index;
pub mod path_rule;
pub mod pattern;

use std::collections::{BTreeSet, HashSet};

use sha2::{Digest, Sha256};

pub use classify::{classify, Classification};
pub use index::PrefixIndex;
pub use path_rule::PathRule;
pub use pattern::CompiledPathMatcher;

/// The active allow policy: ordered path matchers plus publisher and hash allowlists.
///
/// Built once per run and read-only afterwards, so it can be shared across
/// classification threads by reference.
#[derive(Debug, Clone)]
pub struct RuleSet {
    matchers: Vec<CompiledPathMatcher>,
    index: PrefixIndex,
    publishers: HashSet<String>,
    hashes: HashSet<String>,
    fingerprint: String,
}

impl RuleSet {
    /// Compile path rules in the given order and collect publishers and hashes.
    ///
    /// Publisher and hash entries are compared case-insensitively; duplicates
    /// collapse. Empty entries are dropped. A rule whose regex cannot be built
    /// is logged and skipped.
    pub fn new<P, H>(
        path_rules: Vec<PathRule>,
        publishers: P,
        hashes: H,
        case_insensitive_paths: bool,
    ) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        H: IntoIterator,
        H::Item: AsRef<str>,
    {
        let fingerprint_rules: Vec<String> =
            path_rules.iter().map(|r| r.as_str().to_string()).collect();

        let matchers: Vec<CompiledPathMatcher> = path_rules
            .into_iter()
            .enumerate()
            .filter_map(|(i, rule)| {
                match CompiledPathMatcher::compile(i, rule, case_insensitive_paths) {
                    Ok(m) => Some(m),
                    Err(e) => {
                        tracing::warn!(error = %e, "path rule failed to compile, skipping");
                        None
                    }
                }
            })
            .collect();

        let publishers: HashSet<String> = publishers
            .into_iter()
            .map(|p| normalize_publisher(p.as_ref()))
            .filter(|p| !p.is_empty())
            .collect();
        let hashes: HashSet<String> = hashes
            .into_iter()
            .map(|h| normalize_hash(h.as_ref()))
            .filter(|h| !h.is_empty())
            .collect();

        let index = PrefixIndex::build(&matchers, case_insensitive_paths);
        let fingerprint = fingerprint(&fingerprint_rules, &publishers, &hashes);

        tracing::debug!(
            path_rules = matchers.len(),
            prefix_buckets = index.bucket_count(),
            publishers = publishers.len(),
            hashes = hashes.len(),
            "rule set built"
        );

        Self {
            matchers,
            index,
            publishers,
            hashes,
            fingerprint,
        }
    }

    /// Clean and validate raw rule strings, silently dropping the ones that
    /// are not rules, then build as [`RuleSet::new`].
    pub fn from_raw<R, P, H>(
        raw_rules: R,
        publishers: P,
        hashes: H,
        case_insensitive_paths: bool,
    ) -> Self
    where
        R: IntoIterator,
        R::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: AsRef<str>,
        H: IntoIterator,
        H::Item: AsRef<str>,
    {
        let rules = raw_rules
            .into_iter()
            .filter_map(|raw| PathRule::parse(raw.as_ref()))
            .collect();
        Self::new(rules, publishers, hashes, case_insensitive_paths)
    }

    /// Compiled matchers in source order.
    pub fn matchers(&self) -> &[CompiledPathMatcher] {
        &self.matchers
    }

    pub fn publisher_count(&self) -> usize {
        self.publishers.len()
    }

    pub fn hash_count(&self) -> usize {
        self.hashes.len()
    }

    /// Hex SHA-256 over the rule, publisher and hash inputs.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// First matcher, in source order, that matches the whole candidate path.
    pub fn match_path(&self, candidate: &str) -> Option<&CompiledPathMatcher> {
        match self.index.candidates(candidate) {
            Some(slots) => slots
                .into_iter()
                .map(|slot| &self.matchers[slot])
                .find(|m| m.is_match(candidate)),
            None => self.match_path_linear(candidate),
        }
    }

    /// Canonical first-match scan over every matcher.
    pub fn match_path_linear(&self, candidate: &str) -> Option<&CompiledPathMatcher> {
        self.matchers.iter().find(|m| m.is_match(candidate))
    }

    /// Case-insensitive publisher membership. An empty publisher never matches.
    pub fn publisher_allowed(&self, publisher: &str) -> bool {
        let publisher = normalize_publisher(publisher);
        !publisher.is_empty() && self.publishers.contains(&publisher)
    }

    /// Case-insensitive hash membership. An empty hash never matches.
    pub fn hash_allowed(&self, hash: &str) -> bool {
        let hash = normalize_hash(hash);
        !hash.is_empty() && self.hashes.contains(&hash)
    }
}

fn normalize_publisher(publisher: &str) -> String {
    publisher.to_lowercase()
}

fn normalize_hash(hash: &str) -> String {
    hash.to_ascii_lowercase()
}

fn fingerprint(rules: &[String], publishers: &HashSet<String>, hashes: &HashSet<String>) -> String {
    let mut hasher = Sha256::new();
    let sections: [(&str, Vec<&str>); 3] = [
        ("paths", rules.iter().map(String::as_str).collect()),
        (
            "publishers",
            publishers
                .iter()
                .map(String::as_str)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        ),
        (
            "hashes",
            hashes
                .iter()
                .map(String::as_str)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        ),
    ];
    for (name, entries) in sections {
        hasher.update(b"[");
        hasher.update(name.as_bytes());
        hasher.update(b"]\n");
        for entry in entries {
            hasher.update(entry.as_bytes());
            hasher.update(b"\n");
        }
    }
    hex::encode(hasher.finalize())
}
