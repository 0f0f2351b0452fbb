//! # Checker Errors

use crate::config::ConfigError;
use crate::ingest::IngestError;
use crate::registry::SnapshotError;
use crate::results::ReportError;

/// Systemic failures surfaced to callers
///
/// Rule-level problems are never errors; they are carried in results.
#[derive(Debug, thiserror::Error)]
pub enum CheckerError {
    #[error("Ingestion error: {0}")]
    Ingest(#[from] IngestError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("Logging initialization failed: {reason}")]
    Logging { reason: String },
}

impl CheckerError {
    /// Whether the user can fix this and retry
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CheckerError::Ingest(_)
                | CheckerError::Config(_)
                | CheckerError::Snapshot(_)
                | CheckerError::Report(_)
        )
    }

    pub fn user_message(&self) -> String {
        match self {
            CheckerError::Ingest(IngestError::NotASequence { found }) => {
                format!("Rules must be a JSON array of rule objects (found {})", found)
            }
            CheckerError::Ingest(e) => format!("Could not load rules: {}", e),
            CheckerError::Config(e) => format!("Invalid configuration: {}", e),
            CheckerError::Snapshot(e) => format!("Could not load registry snapshot: {}", e),
            CheckerError::Report(e) => format!("Could not produce report: {}", e),
            CheckerError::Logging { reason } => format!("Logging unavailable: {}", reason),
        }
    }
}
