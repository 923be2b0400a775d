//! Execution records: the historical log entries the audit replays.

use serde::{Deserialize, Serialize};

/// One historical execution event.
///
/// Every field defaults to empty so a log line with missing columns still
/// loads; empty fields simply never match an allow mechanism.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExecutionRecord {
    #[serde(default)]
    pub folder: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub user: String,
}

impl ExecutionRecord {
    /// Full path the path rules are matched against: folder and file name concatenated.
    pub fn candidate_path(&self) -> String {
        let mut path = String::with_capacity(self.folder.len() + self.file_name.len());
        path.push_str(&self.folder);
        path.push_str(&self.file_name);
        path
    }
}
