pub mod csv;
pub mod json;
pub mod lists;

use std::fmt;
use std::path::Path;

use crate::error::{AuditError, Result};
use crate::record::ExecutionRecord;

/// Execution log formats understood by the loaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Csv,
    Tsv,
    Json,
    JsonLines,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Tsv => write!(f, "tsv"),
            Self::Json => write!(f, "json"),
            Self::JsonLines => write!(f, "jsonl"),
        }
    }
}

/// A reader for one execution log format.
pub trait LogSource: Send + Sync {
    /// The format this source reads.
    fn format(&self) -> LogFormat;

    /// Check if this source can read the given file.
    fn detect(&self, path: &Path) -> bool;

    /// Load every execution record from the file.
    fn load(&self, path: &Path) -> Result<Vec<ExecutionRecord>>;
}

/// All registered log sources.
pub fn all_sources() -> Vec<Box<dyn LogSource>> {
    vec![
        Box::new(csv::DelimitedSource::csv()),
        Box::new(csv::DelimitedSource::tsv()),
        Box::new(json::JsonSource::array()),
        Box::new(json::JsonSource::lines()),
    ]
}

/// Pick the first source that recognises `path` and load it.
pub fn auto_detect_and_load(path: &Path) -> Result<Vec<ExecutionRecord>> {
    let source = all_sources()
        .into_iter()
        .find(|s| s.detect(path))
        .ok_or_else(|| AuditError::NoSource(path.display().to_string()))?;

    let records = source.load(path)?;
    tracing::info!(
        format = %source.format(),
        path = %path.display(),
        records = records.len(),
        "execution log loaded"
    );
    Ok(records)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
        .unwrap_or(false)
}
