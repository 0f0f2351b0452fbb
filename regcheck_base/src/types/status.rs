//! Three-valued compliance outcome

use std::fmt;

/// Why a rule was not evaluated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotEvaluatedReason {
    /// Registry rule without a registry key
    MissingRegistryKey,
    /// Check type this engine does not evaluate
    UnsupportedCheckType(String),
    /// Source entry could not be read as a rule
    MalformedRule(String),
}

impl fmt::Display for NotEvaluatedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotEvaluatedReason::MissingRegistryKey => {
                write!(f, "registry rule has no registry_key")
            }
            NotEvaluatedReason::UnsupportedCheckType(check_type) if check_type.is_empty() => {
                write!(f, "rule has no check_type")
            }
            NotEvaluatedReason::UnsupportedCheckType(check_type) => {
                write!(f, "check_type '{}' is not supported", check_type)
            }
            NotEvaluatedReason::MalformedRule(detail) => write!(f, "malformed rule: {}", detail),
        }
    }
}

/// Outcome of evaluating one rule
///
/// `NotEvaluated` is never a failure: a rule that could not be checked is
/// reported separately from one that was checked and failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComplianceStatus {
    Compliant,
    NonCompliant,
    NotEvaluated(NotEvaluatedReason),
}

impl ComplianceStatus {
    /// Wire form: `Some(true)`, `Some(false)`, or `None` when not evaluated
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ComplianceStatus::Compliant => Some(true),
            ComplianceStatus::NonCompliant => Some(false),
            ComplianceStatus::NotEvaluated(_) => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "compliant",
            ComplianceStatus::NonCompliant => "non_compliant",
            ComplianceStatus::NotEvaluated(_) => "not_evaluated",
        }
    }

    pub fn is_compliant(&self) -> bool {
        matches!(self, ComplianceStatus::Compliant)
    }

    pub fn is_non_compliant(&self) -> bool {
        matches!(self, ComplianceStatus::NonCompliant)
    }

    pub fn is_evaluated(&self) -> bool {
        !matches!(self, ComplianceStatus::NotEvaluated(_))
    }

    pub fn not_evaluated_reason(&self) -> Option<&NotEvaluatedReason> {
        match self {
            ComplianceStatus::NotEvaluated(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplianceStatus::Compliant => write!(f, "Compliant"),
            ComplianceStatus::NonCompliant => write!(f, "Non-compliant"),
            ComplianceStatus::NotEvaluated(reason) => write!(f, "Not evaluated ({})", reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_evaluated_is_not_false() {
        let status = ComplianceStatus::NotEvaluated(NotEvaluatedReason::MissingRegistryKey);
        assert_eq!(status.as_bool(), None);
        assert!(!status.is_non_compliant());
        assert!(!status.is_evaluated());
    }

    #[test]
    fn test_display() {
        assert_eq!(ComplianceStatus::NonCompliant.to_string(), "Non-compliant");
        assert_eq!(
            ComplianceStatus::NotEvaluated(NotEvaluatedReason::UnsupportedCheckType(
                "file".to_string()
            ))
            .to_string(),
            "Not evaluated (check_type 'file' is not supported)"
        );
    }
}
