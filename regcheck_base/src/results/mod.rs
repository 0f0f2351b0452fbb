//! Results aggregation: summary counts, analysis text, and the JSON report

pub mod report;
pub mod summary;

pub use report::{CheckReport, HostContext, ReportError, TimestampInfo, UserContext};
pub use summary::{render_analysis, ComplianceSummary, OverallStatus};
