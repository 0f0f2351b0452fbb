//! # regcheck - Registry Compliance Checker
//!
//! Evaluates registry compliance rules against a [`registry::RegistrySource`]
//! and reports per-rule outcomes.

#[macro_use]
pub mod logging;
pub mod api;
pub mod commands;
pub mod config;
pub mod execution;
pub mod ingest;
pub mod registry;
pub mod results;
pub mod types;

// Convenience re-exports
pub use api::{CheckerError, ComplianceChecker};
pub use config::CheckerPreferences;
pub use types::{CheckResult, CheckType, ComplianceRule, ComplianceStatus, NotEvaluatedReason};

pub mod prelude {
    pub use crate::api::{CheckerError, ComplianceChecker};
    pub use crate::commands::{CommandError, CommandOutput, SystemCommandExecutor};
    pub use crate::config::CheckerPreferences;
    pub use crate::execution::{BatchEvaluator, RuleEvaluator};
    pub use crate::ingest::IngestError;
    pub use crate::registry::{
        normalize, MemoryRegistry, PathResolution, QueryFailure, ReadError, RegistryPath,
        RegistryReader, RegistrySource, RegistryValue, RootKey,
    };
    pub use crate::results::{render_analysis, CheckReport, ComplianceSummary, OverallStatus};
    pub use crate::types::{
        CheckResult, CheckType, ComplianceRule, ComplianceStatus, NotEvaluatedReason,
    };
}
