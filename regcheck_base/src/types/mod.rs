//! Core data types: rules in, results out

pub mod result;
pub mod rule;
pub mod status;

pub use result::CheckResult;
pub use rule::{CheckType, ComplianceRule};
pub use status::{ComplianceStatus, NotEvaluatedReason};
