use std::path::PathBuf;

/// Systemic rule-set failures
///
/// Per-rule problems never land here; they become `NotEvaluated` results.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Rule set must be a JSON array, found {found}")]
    NotASequence { found: String },

    #[error("Rule set is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Rule file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("Rule file {} is {size} bytes, limit is {limit}", path.display())]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("Rule set has {count} rules, limit is {limit}")]
    TooManyRules { count: usize, limit: usize },

    #[error("No rule files found in {}", path.display())]
    NoRuleFiles { path: PathBuf },

    #[error("Cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IngestError {
    pub fn code(&self) -> crate::logging::Code {
        use crate::logging::codes::ingest;
        match self {
            IngestError::NotASequence { .. } => ingest::RULE_SET_NOT_A_SEQUENCE,
            IngestError::InvalidJson(_) => ingest::RULE_JSON_INVALID,
            IngestError::FileNotFound { .. } | IngestError::NoRuleFiles { .. } => {
                ingest::RULE_FILE_NOT_FOUND
            }
            IngestError::FileTooLarge { .. } => ingest::RULE_FILE_TOO_LARGE,
            IngestError::TooManyRules { .. } => ingest::RULE_LIMIT_EXCEEDED,
            IngestError::Io { .. } => ingest::RULE_FILE_NOT_FOUND,
        }
    }
}
