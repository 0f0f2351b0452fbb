//! # Public API
//!
//! High-level entry points for embedding the checker.

pub mod checker;
pub mod errors;

pub use checker::ComplianceChecker;
pub use errors::CheckerError;
