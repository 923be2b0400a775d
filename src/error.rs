use thiserror::Error;

pub type Result<T> = std::result::Result<T, AuditError>;

#[derive(Error, Debug)]
pub enum AuditError {
    #[error("Parse error in {file}: {message}")]
    Parse { file: String, message: String },

    #[error("No suitable execution log reader for: {0}")]
    NoSource(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Rule error ({rule}): {message}")]
    Rule { rule: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl AuditError {
    pub fn exit_code(&self) -> i32 {
        2
    }
}
