//! JSON execution logs: a single array, or one object per line.

use std::path::Path;

use super::{has_extension, LogFormat, LogSource};
use crate::error::{AuditError, Result};
use crate::record::ExecutionRecord;

pub struct JsonSource {
    format: LogFormat,
}

impl JsonSource {
    pub fn array() -> Self {
        Self {
            format: LogFormat::Json,
        }
    }

    pub fn lines() -> Self {
        Self {
            format: LogFormat::JsonLines,
        }
    }

    pub fn parse(&self, text: &str, origin: &str) -> Result<Vec<ExecutionRecord>> {
        match self.format {
            LogFormat::JsonLines => text
                .lines()
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(n, line)| {
                    serde_json::from_str::<ExecutionRecord>(line).map_err(|e| AuditError::Parse {
                        file: origin.to_string(),
                        message: format!("line {}: {e}", n + 1),
                    })
                })
                .collect(),
            _ => Ok(serde_json::from_str(text)?),
        }
    }
}

impl LogSource for JsonSource {
    fn format(&self) -> LogFormat {
        self.format
    }

    fn detect(&self, path: &Path) -> bool {
        match self.format {
            LogFormat::JsonLines => has_extension(path, &["jsonl", "ndjson"]),
            _ => has_extension(path, &["json"]),
        }
    }

    fn load(&self, path: &Path) -> Result<Vec<ExecutionRecord>> {
        let text = std::fs::read_to_string(path)?;
        self.parse(&text, &path.display().to_string())
    }
}
