//! Compliance rule input type

use crate::registry::target_label;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of check a rule asks for
///
/// Only `registry` is evaluated; any other value is carried through so the
/// result can report what was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CheckType {
    Registry,
    #[default]
    Unspecified,
    Other(String),
}

impl CheckType {
    pub fn as_str(&self) -> &str {
        match self {
            CheckType::Registry => "registry",
            CheckType::Unspecified => "",
            CheckType::Other(other) => other,
        }
    }
}

impl From<String> for CheckType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "registry" => CheckType::Registry,
            "" => CheckType::Unspecified,
            _ => CheckType::Other(value),
        }
    }
}

impl From<&str> for CheckType {
    fn from(value: &str) -> Self {
        CheckType::from(value.to_string())
    }
}

impl From<CheckType> for String {
    fn from(value: CheckType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One flat compliance rule: a registry value that must equal an expected value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceRule {
    pub name: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub check_type: CheckType,

    #[serde(default)]
    pub registry_key: Option<String>,

    #[serde(default)]
    pub value_name: Option<String>,

    #[serde(default)]
    pub expected_value: String,

    /// Set by ingestion when the source entry could not be read as a rule
    #[serde(skip)]
    pub ingest_defect: Option<String>,
}

impl ComplianceRule {
    /// Registry rule with all fields present
    pub fn registry(
        name: impl Into<String>,
        registry_key: impl Into<String>,
        value_name: impl Into<String>,
        expected_value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            check_type: CheckType::Registry,
            registry_key: Some(registry_key.into()),
            value_name: Some(value_name.into()),
            expected_value: expected_value.into(),
            ingest_defect: None,
        }
    }

    pub fn with_check_type(mut self, check_type: impl Into<CheckType>) -> Self {
        self.check_type = check_type.into();
        self
    }

    pub fn without_registry_key(mut self) -> Self {
        self.registry_key = None;
        self
    }

    pub fn without_value_name(mut self) -> Self {
        self.value_name = None;
        self
    }

    /// Value name to query; `None` addresses the key's default value
    pub fn effective_value_name(&self) -> &str {
        self.value_name.as_deref().unwrap_or("")
    }

    /// Raw `key\value` target used in diagnostics
    pub fn target(&self) -> Option<String> {
        let key = self.registry_key.as_deref()?;
        Some(target_label(key, self.effective_value_name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_type_from_string() {
        assert_eq!(CheckType::from("registry"), CheckType::Registry);
        assert_eq!(CheckType::from(""), CheckType::Unspecified);
        assert_eq!(
            CheckType::from("Registry"),
            CheckType::Other("Registry".to_string())
        );
        assert_eq!(CheckType::from("file").as_str(), "file");
    }

    #[test]
    fn test_rule_deserializes_with_missing_optionals() {
        let rule: ComplianceRule = serde_json::from_str(
            r#"{"name": "A", "check_type": "registry", "expected_value": "1"}"#,
        )
        .unwrap();

        assert_eq!(rule.check_type, CheckType::Registry);
        assert!(rule.registry_key.is_none());
        assert!(rule.value_name.is_none());
        assert!(rule.ingest_defect.is_none());
    }

    #[test]
    fn test_target_rendering() {
        let rule = ComplianceRule::registry("A", "HKLM\\X", "V", "1");
        assert_eq!(rule.target().as_deref(), Some("HKLM\\X\\V"));

        let default_value = rule.clone().without_value_name();
        assert_eq!(default_value.target().as_deref(), Some("HKLM\\X\\(Default)"));
        assert_eq!(default_value.effective_value_name(), "");

        assert!(rule.without_registry_key().target().is_none());
    }
}
