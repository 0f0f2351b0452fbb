//! Compliance counts and the human-readable analysis

use crate::config::compile_time::reporting::MAX_RENDERED_VALUE_LENGTH;
use crate::types::{CheckResult, ComplianceStatus};
use serde::Serialize;
use std::fmt;

/// Overall verdict for a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    /// Every rule was evaluated and passed
    Compliant,
    /// At least one rule failed
    NonCompliant,
    /// Nothing failed but some rules were not evaluated
    Incomplete,
    /// No rules
    Empty,
}

impl OverallStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OverallStatus::Compliant => "compliant",
            OverallStatus::NonCompliant => "non_compliant",
            OverallStatus::Incomplete => "incomplete",
            OverallStatus::Empty => "empty",
        }
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceSummary {
    pub total: usize,
    pub compliant: usize,
    pub non_compliant: usize,
    pub not_evaluated: usize,

    /// Compliant share of evaluated rules
    pub pass_percentage: f32,

    pub status: OverallStatus,
}

impl ComplianceSummary {
    pub fn from_results(results: &[CheckResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            compliant: 0,
            non_compliant: 0,
            not_evaluated: 0,
            pass_percentage: 0.0,
            status: OverallStatus::Empty,
        };

        for result in results {
            match result.status() {
                ComplianceStatus::Compliant => summary.compliant += 1,
                ComplianceStatus::NonCompliant => summary.non_compliant += 1,
                ComplianceStatus::NotEvaluated(_) => summary.not_evaluated += 1,
            }
        }

        let evaluated = summary.evaluated();
        if evaluated > 0 {
            summary.pass_percentage = (summary.compliant as f32 / evaluated as f32) * 100.0;
        }

        summary.status = if summary.total == 0 {
            OverallStatus::Empty
        } else if summary.non_compliant > 0 {
            OverallStatus::NonCompliant
        } else if summary.not_evaluated > 0 {
            OverallStatus::Incomplete
        } else {
            OverallStatus::Compliant
        };

        summary
    }

    pub fn evaluated(&self) -> usize {
        self.compliant + self.non_compliant
    }

    pub fn has_failures(&self) -> bool {
        self.non_compliant > 0
    }
}

fn truncate(value: &str) -> String {
    if value.chars().count() <= MAX_RENDERED_VALUE_LENGTH {
        value.to_string()
    } else {
        let head: String = value.chars().take(MAX_RENDERED_VALUE_LENGTH).collect();
        format!("{}...", head)
    }
}

/// Render the analysis text: counts first, then one block per rule
pub fn render_analysis(results: &[CheckResult]) -> String {
    let summary = ComplianceSummary::from_results(results);

    let mut lines = vec![
        "Compliance Analysis Summary:".to_string(),
        format!("- Total rules checked: {}", summary.total),
        format!("- Compliant rules: {}", summary.compliant),
        format!("- Non-compliant rules: {}", summary.non_compliant),
        format!("- Not evaluated rules: {}", summary.not_evaluated),
        "\nDetailed Findings:".to_string(),
    ];

    for result in results {
        lines.push(format!("\n{}:", result.name()));
        lines.push(format!("- Status: {}", result.status()));
        lines.push(format!(
            "- Current Value: {}",
            result.current_value().map(truncate).unwrap_or_else(|| "N/A".to_string())
        ));
        lines.push(format!("- Expected Value: {}", truncate(result.expected_value())));
    }

    lines.join("\n")
}
