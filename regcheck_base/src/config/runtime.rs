// RUNTIME PREFERENCES (User Experience)

use super::constants::compile_time::execution::MAX_WORKER_THREADS;
use super::ConfigError;
use crate::logging::LogLevel;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Runtime preferences for the checker
///
/// Defaults come from `REGCHECK_*` environment variables; a TOML file may
/// override any subset of fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckerPreferences {
    /// Log a warning when a rule's registry key is absent before reading
    pub advisory_presence_check: bool,

    /// Worker threads for batch evaluation (1 = sequential)
    pub max_threads: usize,

    /// Minimum level emitted by the logging service
    pub log_level: LogLevel,

    /// Emit JSON-lines log events instead of human-readable lines
    pub structured_logging: bool,

    /// Forward log events to the `log` facade
    pub log_facade: bool,

    /// Exit non-zero from the CLI when any rule is non-compliant
    pub fail_on_non_compliant: bool,
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for CheckerPreferences {
    fn default() -> Self {
        Self {
            advisory_presence_check: env_flag("REGCHECK_ADVISORY_PRESENCE_CHECK", true),
            max_threads: env::var("REGCHECK_MAX_THREADS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
            log_level: env::var("REGCHECK_LOG_LEVEL")
                .ok()
                .and_then(|v| LogLevel::parse(&v))
                .unwrap_or(LogLevel::Info),
            structured_logging: env_flag("REGCHECK_STRUCTURED_LOGGING", false),
            log_facade: env_flag("REGCHECK_LOG_FACADE", false),
            fail_on_non_compliant: env_flag("REGCHECK_FAIL_ON_NON_COMPLIANT", true),
        }
    }
}

impl CheckerPreferences {
    /// Parse preferences from TOML text, filling gaps from defaults
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let preferences: Self = toml::from_str(text)?;
        preferences.validate()?;
        Ok(preferences)
    }

    /// Load preferences from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check values against compile-time limits
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_threads == 0 || self.max_threads > MAX_WORKER_THREADS {
            return Err(ConfigError::LimitViolation {
                field: "max_threads".to_string(),
                reason: format!(
                    "must be between 1 and {}, got {}",
                    MAX_WORKER_THREADS, self.max_threads
                ),
            });
        }
        Ok(())
    }

    pub fn with_max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = max_threads;
        self
    }

    pub fn with_presence_check(mut self, enabled: bool) -> Self {
        self.advisory_presence_check = enabled;
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let preferences = CheckerPreferences::from_toml_str(
            r#"
            max_threads = 4
            log_level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(preferences.max_threads, 4);
        assert_eq!(preferences.log_level, LogLevel::Debug);
        assert_eq!(
            preferences.advisory_presence_check,
            CheckerPreferences::default().advisory_presence_check
        );
    }

    #[test]
    fn test_thread_limit_enforced() {
        let result = CheckerPreferences::from_toml_str("max_threads = 0");
        assert_matches!(result, Err(ConfigError::LimitViolation { .. }));

        let result = CheckerPreferences::default()
            .with_max_threads(MAX_WORKER_THREADS + 1)
            .validate();
        assert_matches!(result, Err(ConfigError::LimitViolation { .. }));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        let result = CheckerPreferences::from_toml_str("max_threads = \"many\"");
        assert_matches!(result, Err(ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "advisory_presence_check = false").unwrap();

        let preferences = CheckerPreferences::from_toml_file(file.path()).unwrap();
        assert!(!preferences.advisory_presence_check);

        let missing = CheckerPreferences::from_toml_file(Path::new("/nonexistent/regcheck.toml"));
        assert_matches!(missing, Err(ConfigError::Unreadable { .. }));
    }
}
