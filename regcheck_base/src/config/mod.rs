//! Configuration for the checker
//!
//! Compile-time limits live in [`constants`]; user preferences in
//! [`runtime`].

pub mod constants;
pub mod runtime;

pub use constants::compile_time;
pub use runtime::CheckerPreferences;

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read configuration file '{path}': {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Configuration field '{field}' {reason}")]
    LimitViolation { field: String, reason: String },
}

impl ConfigError {
    pub fn code(&self) -> crate::logging::Code {
        use crate::logging::codes::config;
        match self {
            ConfigError::Unreadable { .. } => config::CONFIG_FILE_UNREADABLE,
            ConfigError::Parse(_) => config::CONFIG_PARSE_ERROR,
            ConfigError::LimitViolation { .. } => config::CONFIG_LIMIT_VIOLATION,
        }
    }
}
