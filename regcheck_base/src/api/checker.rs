//! # Compliance Checker
//!
//! Entry point tying ingestion, batch evaluation and reporting together for
//! one registry source. The checker holds only its source and preferences;
//! every call builds and returns its own results.

use super::errors::CheckerError;
use crate::config::CheckerPreferences;
use crate::execution::BatchEvaluator;
use crate::ingest;
use crate::log_info;
use crate::registry::RegistrySource;
use crate::results::{render_analysis, CheckReport};
use crate::types::{CheckResult, ComplianceRule};
use chrono::Utc;
use serde_json::Value;
use std::path::Path;

#[derive(Debug)]
pub struct ComplianceChecker<S: RegistrySource> {
    source: S,
    preferences: CheckerPreferences,
}

impl<S: RegistrySource> ComplianceChecker<S> {
    /// Checker with default preferences
    pub fn new(source: S) -> Self {
        Self {
            source,
            preferences: CheckerPreferences::default(),
        }
    }

    /// Checker with validated preferences
    pub fn with_preferences(source: S, preferences: CheckerPreferences) -> Result<Self, CheckerError> {
        preferences.validate()?;
        Ok(Self {
            source,
            preferences,
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn preferences(&self) -> &CheckerPreferences {
        &self.preferences
    }

    /// Evaluate rules, one result per rule in input order
    pub fn check_rules(&self, rules: &[ComplianceRule]) -> Vec<CheckResult> {
        BatchEvaluator::from_preferences(&self.source, &self.preferences).check_all(rules)
    }

    /// Evaluate an untrusted JSON rule set
    pub fn check_json(&self, rules: &Value) -> Result<Vec<CheckResult>, CheckerError> {
        let rules = ingest::parse_rules_value(rules)?;
        Ok(self.check_rules(&rules))
    }

    /// Evaluate rule-set text
    pub fn check_str(&self, text: &str) -> Result<Vec<CheckResult>, CheckerError> {
        let rules = ingest::parse_rules_str(text)?;
        Ok(self.check_rules(&rules))
    }

    /// Load rules from a file or directory and produce a full report
    pub fn check_path(&self, path: &Path) -> Result<CheckReport, CheckerError> {
        let started = Utc::now();
        let rules = ingest::load_rules(path)?;

        log_info!("Evaluating rules",
            "path" => path.display(),
            "rules" => rules.len(),
            "source" => self.source.source_id()
        );

        let results = self.check_rules(&rules);
        Ok(self.report(results, started))
    }

    /// Wrap results in a report attributed to this checker's source
    pub fn report(&self, results: Vec<CheckResult>, started: chrono::DateTime<Utc>) -> CheckReport {
        CheckReport::new(self.source.source_id(), results, started)
    }

    /// Human-readable analysis of results
    pub fn analyze(&self, results: &[CheckResult]) -> String {
        render_analysis(results)
    }
}
