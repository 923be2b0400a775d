use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, Result};

/// Top-level configuration from `.allowaudit.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub audit: AuditSettings,
    #[serde(default)]
    pub report: ReportSettings,
}

/// How execution records are evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSettings {
    /// Classify records on the rayon thread pool.
    #[serde(default = "default_true")]
    pub parallel: bool,
    /// Compile path rules case-insensitively.
    #[serde(default)]
    pub case_insensitive_paths: bool,
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            parallel: true,
            case_insensitive_paths: false,
        }
    }
}

/// What ends up in the rendered report and how the run is judged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSettings {
    /// Render only rows that would be blocked.
    #[serde(default)]
    pub only_blocked: bool,
    /// Fail the run (exit 1) when any row would be blocked.
    #[serde(default)]
    pub fail_on_blocked: bool,
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load config from a TOML file. Returns default if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load config from a path the user asked for explicitly; a missing file is an error.
    pub fn load_required(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(AuditError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        Self::load(path)
    }

    /// Generate a starter config file.
    pub fn starter_toml() -> &'static str {
        r#"# allowaudit configuration

[audit]
# Classify execution records in parallel.
parallel = true

# Match path rules without regard to letter case.
case_insensitive_paths = false

[report]
# Only render executions that would have been blocked.
only_blocked = false

# Exit with status 1 when any execution would have been blocked.
fail_on_blocked = false
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.audit.parallel);
    }

    #[test]
    fn missing_required_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_required(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, AuditError::Config(_)));
    }

    #[test]
    fn starter_toml_round_trips_to_defaults() {
        let config: Config = toml::from_str(Config::starter_toml()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[report]\nfail_on_blocked = true").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert!(config.report.fail_on_blocked);
        assert!(!config.report.only_blocked);
        assert!(config.audit.parallel);
    }
}
