//! Check result output type

use super::rule::ComplianceRule;
use super::status::ComplianceStatus;
use serde::{Serialize, Serializer};

/// Outcome of evaluating one rule against live state
///
/// Built once by the evaluator and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    rule: ComplianceRule,
    status: ComplianceStatus,
    current_value: Option<String>,
}

impl CheckResult {
    pub fn new(rule: ComplianceRule, status: ComplianceStatus, current_value: Option<String>) -> Self {
        Self {
            rule,
            status,
            current_value,
        }
    }

    pub fn rule(&self) -> &ComplianceRule {
        &self.rule
    }

    pub fn name(&self) -> &str {
        &self.rule.name
    }

    pub fn status(&self) -> &ComplianceStatus {
        &self.status
    }

    /// Wire form of the status: `None` when not evaluated
    pub fn compliant(&self) -> Option<bool> {
        self.status.as_bool()
    }

    /// Observed value, or the read error text when the read failed
    pub fn current_value(&self) -> Option<&str> {
        self.current_value.as_deref()
    }

    pub fn expected_value(&self) -> &str {
        &self.rule.expected_value
    }
}

/// Flat JSON shape: rule fields, `compliant` (omitted when not evaluated),
/// `status`, optional `reason`, and `current_value`
#[derive(Serialize)]
struct CheckResultRecord<'a> {
    name: &'a str,
    description: &'a str,
    check_type: &'a str,
    registry_key: Option<&'a str>,
    value_name: Option<&'a str>,
    expected_value: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    compliant: Option<bool>,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    current_value: Option<&'a str>,
}

impl<'a> From<&'a CheckResult> for CheckResultRecord<'a> {
    fn from(result: &'a CheckResult) -> Self {
        Self {
            name: &result.rule.name,
            description: &result.rule.description,
            check_type: result.rule.check_type.as_str(),
            registry_key: result.rule.registry_key.as_deref(),
            value_name: result.rule.value_name.as_deref(),
            expected_value: &result.rule.expected_value,
            compliant: result.status.as_bool(),
            status: result.status.as_str(),
            reason: result
                .status
                .not_evaluated_reason()
                .map(|reason| reason.to_string()),
            current_value: result.current_value.as_deref(),
        }
    }
}

impl Serialize for CheckResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        CheckResultRecord::from(self).serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::status::NotEvaluatedReason;

    #[test]
    fn test_serialized_shape_for_non_compliant() {
        let rule = ComplianceRule::registry("A", "HKLM\\X", "V", "1");
        let result = CheckResult::new(
            rule,
            ComplianceStatus::NonCompliant,
            Some("Registry key/value not found: HKLM\\X\\V".to_string()),
        );

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["name"], "A");
        assert_eq!(json["check_type"], "registry");
        assert_eq!(json["compliant"], false);
        assert_eq!(json["status"], "non_compliant");
        assert_eq!(
            json["current_value"],
            "Registry key/value not found: HKLM\\X\\V"
        );
        assert!(json.get("reason").is_none());
    }

    #[test]
    fn test_not_evaluated_omits_compliant() {
        let rule = ComplianceRule::registry("B", "HKLM\\X", "V", "1").without_registry_key();
        let result = CheckResult::new(
            rule,
            ComplianceStatus::NotEvaluated(NotEvaluatedReason::MissingRegistryKey),
            None,
        );

        let json = serde_json::to_value(&result).unwrap();
        assert!(json.get("compliant").is_none());
        assert_eq!(json["status"], "not_evaluated");
        assert_eq!(json["reason"], "registry rule has no registry_key");
        assert!(json["registry_key"].is_null());
        assert!(json["current_value"].is_null());
    }
}
