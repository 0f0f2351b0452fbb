//! # Check Report
//!
//! Auditable record of one evaluation pass: where and by whom it ran, when,
//! against which registry source, and every result. Serialized to JSON for
//! archival and downstream tooling.

use super::summary::ComplianceSummary;
use crate::logging::codes;
use crate::{log_error, log_success};
use crate::types::CheckResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Report serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cannot write report to {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Complete report for one evaluation pass
#[derive(Debug, Clone, Serialize)]
pub struct CheckReport {
    /// Unique identifier for this report
    pub report_id: String,

    /// Registry source the rules were evaluated against
    pub source: String,

    pub host: HostContext,
    pub user_context: UserContext,
    pub timestamp: TimestampInfo,
    pub summary: ComplianceSummary,
    pub results: Vec<CheckResult>,
}

/// Host execution context
#[derive(Debug, Clone, Serialize)]
pub struct HostContext {
    pub hostname: String,

    /// Operating system and architecture
    pub os_info: String,
}

/// User execution context
#[derive(Debug, Clone, Serialize)]
pub struct UserContext {
    pub username: String,

    /// Security identifier, when it could be resolved
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,

    pub process_info: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimestampInfo {
    pub started: DateTime<Utc>,
    pub finished: DateTime<Utc>,
    pub duration_ms: u64,
}

impl CheckReport {
    /// Build a report for results produced since `started`
    pub fn new(source: impl Into<String>, results: Vec<CheckResult>, started: DateTime<Utc>) -> Self {
        let finished = Utc::now();

        Self {
            report_id: uuid::Uuid::new_v4().to_string(),
            source: source.into(),
            host: HostContext::from_system(),
            user_context: UserContext::from_environment(),
            timestamp: TimestampInfo {
                started,
                finished,
                duration_ms: (finished - started).num_milliseconds().max(0) as u64,
            },
            summary: ComplianceSummary::from_results(&results),
            results,
        }
    }

    pub fn with_user_context(mut self, user_context: UserContext) -> Self {
        self.user_context = user_context;
        self
    }

    /// True when no rule is non-compliant
    pub fn passed(&self) -> bool {
        !self.summary.has_failures()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_json_compact(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Write pretty JSON to `path`
    pub fn write_to(&self, path: &Path) -> Result<(), ReportError> {
        let json = self.to_json()?;
        if let Err(source) = fs::write(path, json) {
            log_error!(
                codes::reporting::REPORT_WRITE_FAILED,
                "Report could not be written",
                "path" => path.display(),
                "error" => &source
            );
            return Err(ReportError::Write {
                path: path.display().to_string(),
                source,
            });
        }

        log_success!(
            codes::success::REPORT_WRITTEN,
            "Report written",
            "path" => path.display(),
            "report_id" => &self.report_id
        );
        Ok(())
    }
}

impl HostContext {
    pub fn from_system() -> Self {
        Self {
            hostname: hostname::get()
                .unwrap_or_else(|_| std::ffi::OsString::from("unknown"))
                .to_string_lossy()
                .to_string(),
            os_info: format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
        }
    }
}

impl UserContext {
    pub fn from_environment() -> Self {
        let username = std::env::var("USERNAME")
            .or_else(|_| std::env::var("USER"))
            .unwrap_or_else(|_| "unknown".to_string());

        Self {
            username,
            sid: None,
            process_info: format!("pid:{}", std::process::id()),
        }
    }

    pub fn with_sid(mut self, sid: impl Into<String>) -> Self {
        self.sid = Some(sid.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::OverallStatus;
    use crate::types::{ComplianceRule, ComplianceStatus};
    use tempfile::TempDir;

    fn report() -> CheckReport {
        let results = vec![
            CheckResult::new(
                ComplianceRule::registry("A", "HKLM\\X", "V", "1"),
                ComplianceStatus::Compliant,
                Some("1".to_string()),
            ),
            CheckResult::new(
                ComplianceRule::registry("B", "HKLM\\X", "W", "1"),
                ComplianceStatus::NonCompliant,
                Some("0".to_string()),
            ),
        ];
        CheckReport::new("memory", results, Utc::now())
    }

    #[test]
    fn test_report_fields() {
        let report = report();
        assert_eq!(report.summary.status, OverallStatus::NonCompliant);
        assert!(!report.passed());
        assert!(uuid::Uuid::parse_str(&report.report_id).is_ok());
        assert!(report.timestamp.finished >= report.timestamp.started);
    }

    #[test]
    fn test_report_json() {
        let report = report().with_user_context(UserContext::from_environment().with_sid("S-1-5-21-1-2-3-1001"));
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();

        assert_eq!(json["source"], "memory");
        assert_eq!(json["summary"]["status"], "non_compliant");
        assert_eq!(json["summary"]["compliant"], 1);
        assert_eq!(json["results"][1]["compliant"], false);
        assert_eq!(json["results"][1]["current_value"], "0");
        assert_eq!(json["user_context"]["sid"], "S-1-5-21-1-2-3-1001");
        assert!(!report.to_json_compact().unwrap().contains('\n'));
    }

    #[test]
    fn test_write_to() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("report.json");

        report().write_to(&path).unwrap();
        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["results"].as_array().unwrap().len(), 2);

        let missing_dir = dir.path().join("nope").join("report.json");
        assert!(matches!(report().write_to(&missing_dir), Err(ReportError::Write { .. })));
    }
}
