//! Lenient rule parsing
//!
//! Rule sets are untrusted. Only the top-level shape is enforced; every
//! element yields at least one rule, and elements that cannot be read as a
//! rule carry an ingest defect so they evaluate as not evaluated.

use super::errors::IngestError;
use crate::config::compile_time::ingest::{MAX_RULES_PER_SET, UNNAMED_RULE};
use crate::logging::codes;
use crate::types::{CheckType, ComplianceRule};
use crate::{log_info, log_warning};
use serde_json::{Map, Value};

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parse rule-set text; a JSON string whose content is an array is also accepted
pub fn parse_rules_str(text: &str) -> Result<Vec<ComplianceRule>, IngestError> {
    let value: Value = serde_json::from_str(text)?;
    parse_rules_value(&value)
}

/// Parse a rule set already decoded as JSON
pub fn parse_rules_value(value: &Value) -> Result<Vec<ComplianceRule>, IngestError> {
    let elements = match value {
        Value::Array(elements) => elements,
        Value::String(inner) => {
            let decoded: Value = serde_json::from_str(inner)?;
            return match decoded {
                Value::Array(_) => parse_rules_value(&decoded),
                other => Err(IngestError::NotASequence {
                    found: format!("string containing {}", json_type_name(&other)),
                }),
            };
        }
        other => {
            return Err(IngestError::NotASequence {
                found: json_type_name(other).to_string(),
            })
        }
    };

    let mut rules = Vec::with_capacity(elements.len());
    for (index, element) in elements.iter().enumerate() {
        rules.extend(parse_element(index, element));
        if rules.len() > MAX_RULES_PER_SET {
            return Err(IngestError::TooManyRules {
                count: rules.len(),
                limit: MAX_RULES_PER_SET,
            });
        }
    }

    log_info!("Parsed rule set", "elements" => elements.len(), "rules" => rules.len());
    Ok(rules)
}

fn parse_element(index: usize, element: &Value) -> Vec<ComplianceRule> {
    let Value::Object(fields) = element else {
        let defect = format!("element {} is a {}, expected an object", index, json_type_name(element));
        return vec![malformed(UNNAMED_RULE.to_string(), defect)];
    };

    let mut base = RuleFields::read(fields);

    match fields.get("registry_checks") {
        None | Some(Value::Null) => vec![base.into_rule(fields)],
        Some(Value::Array(checks)) => {
            if checks.is_empty() {
                log_info!("Rule has an empty registry_checks list", "rule" => &base.name);
            }
            checks
                .iter()
                .map(|check| match check {
                    Value::Object(check_fields) => base.clone().into_rule(check_fields),
                    other => {
                        let defect = format!("registry check is a {}, expected an object", json_type_name(other));
                        malformed(base.name.clone(), defect)
                    }
                })
                .collect()
        }
        Some(other) => {
            base.defects.push(format!(
                "registry_checks is a {}, expected an array",
                json_type_name(other)
            ));
            vec![base.into_rule(fields)]
        }
    }
}

fn malformed(name: String, defect: String) -> ComplianceRule {
    log_warning!(
        codes::ingest::MALFORMED_RULE_ENTRY,
        "Rule entry is malformed",
        "rule" => &name,
        "defect" => &defect
    );
    ComplianceRule {
        name,
        description: String::new(),
        check_type: CheckType::Unspecified,
        registry_key: None,
        value_name: None,
        expected_value: String::new(),
        ingest_defect: Some(defect),
    }
}

/// Fields shared by a rule and, in the extraction format, all its checks
#[derive(Clone)]
struct RuleFields {
    name: String,
    description: String,
    check_type: String,
    registry_key: Option<String>,
    defects: Vec<String>,
}

impl RuleFields {
    fn read(fields: &Map<String, Value>) -> Self {
        let mut defects = Vec::new();
        let name = text_field(fields, "name", &mut defects)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| UNNAMED_RULE.to_string());

        Self {
            name,
            description: text_field(fields, "description", &mut defects).unwrap_or_default(),
            check_type: text_field(fields, "check_type", &mut defects).unwrap_or_default(),
            registry_key: text_field(fields, "registry_key", &mut defects)
                .filter(|key| !key.trim().is_empty()),
            defects,
        }
    }

    /// Complete with `value_name` and `expected_value` from `fields`
    fn into_rule(mut self, fields: &Map<String, Value>) -> ComplianceRule {
        let value_name = text_field(fields, "value_name", &mut self.defects);
        let expected_value = scalar_field(fields, "expected_value", &mut self.defects);

        let ingest_defect = if self.defects.is_empty() {
            None
        } else {
            let defect = self.defects.join("; ");
            log_warning!(
                codes::ingest::MALFORMED_RULE_ENTRY,
                "Rule entry is malformed",
                "rule" => &self.name,
                "defect" => &defect
            );
            Some(defect)
        };

        ComplianceRule {
            name: self.name,
            description: self.description,
            check_type: CheckType::from(self.check_type),
            registry_key: self.registry_key,
            value_name,
            expected_value,
            ingest_defect,
        }
    }
}

/// String field; missing or null is `None`, other types are a defect
fn text_field(fields: &Map<String, Value>, key: &str, defects: &mut Vec<String>) -> Option<String> {
    match fields.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => {
            defects.push(format!("{} is a {}, expected a string", key, json_type_name(other)));
            None
        }
    }
}

/// Scalar field stringified; numbers and booleans keep their JSON text
fn scalar_field(fields: &Map<String, Value>, key: &str, defects: &mut Vec<String>) -> String {
    match fields.get(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(other) => {
            defects.push(format!("{} is a {}, expected a scalar", key, json_type_name(other)));
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn test_flat_rules() {
        let rules = parse_rules_value(&json!([
            {
                "name": "Firewall",
                "description": "Domain profile firewall on",
                "check_type": "registry",
                "registry_key": "HKLM\\SOFTWARE\\Policies\\Microsoft\\WindowsFirewall\\DomainProfile",
                "value_name": "EnableFirewall",
                "expected_value": 1
            }
        ]))
        .unwrap();

        assert_eq!(rules.len(), 1);
        let rule = &rules[0];
        assert_eq!(rule.name, "Firewall");
        assert_eq!(rule.check_type, CheckType::Registry);
        assert_eq!(rule.value_name.as_deref(), Some("EnableFirewall"));
        assert_eq!(rule.expected_value, "1");
        assert!(rule.ingest_defect.is_none());
    }

    #[test]
    fn test_extraction_format_is_flattened() {
        let rules = parse_rules_value(&json!([
            {
                "name": "Screen saver",
                "description": "Lock the screen",
                "check_type": "registry",
                "registry_key": "HKCU\\Control Panel\\Desktop",
                "registry_checks": [
                    {"value_name": "ScreenSaveActive", "expected_value": "1"},
                    {"value_name": "ScreenSaverIsSecure", "expected_value": true},
                    {"value_name": "ScreenSaveTimeOut", "expected_value": 900}
                ]
            }
        ]))
        .unwrap();

        assert_eq!(rules.len(), 3);
        for rule in &rules {
            assert_eq!(rule.name, "Screen saver");
            assert_eq!(rule.description, "Lock the screen");
            assert_eq!(rule.registry_key.as_deref(), Some("HKCU\\Control Panel\\Desktop"));
        }
        assert_eq!(rules[1].expected_value, "true");
        assert_eq!(rules[2].value_name.as_deref(), Some("ScreenSaveTimeOut"));
        assert_eq!(rules[2].expected_value, "900");
    }

    #[test]
    fn test_missing_fields_degrade() {
        let rules = parse_rules_value(&json!([
            {},
            {"name": "", "check_type": "registry", "registry_key": "  ", "value_name": "V"}
        ]))
        .unwrap();

        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].name, UNNAMED_RULE);
        assert_eq!(rules[0].check_type, CheckType::Unspecified);
        assert!(rules[0].registry_key.is_none());
        assert_eq!(rules[0].expected_value, "");
        assert!(rules[0].ingest_defect.is_none());
        assert_eq!(rules[1].name, UNNAMED_RULE);
        assert!(rules[1].registry_key.is_none());
        assert!(rules[1].ingest_defect.is_none());
    }

    #[test]
    fn test_wrong_types_mark_rule_malformed() {
        let rules = parse_rules_value(&json!([
            42,
            {"name": "A", "check_type": "registry", "registry_key": 7, "expected_value": "1"},
            {"name": "B", "registry_checks": "nope"},
            {"name": "C", "registry_checks": [1]}
        ]))
        .unwrap();

        assert_eq!(rules.len(), 4);
        assert!(rules[0].ingest_defect.as_deref().unwrap().contains("number"));
        assert_eq!(rules[1].name, "A");
        assert!(rules[1].ingest_defect.as_deref().unwrap().contains("registry_key"));
        assert!(rules[2].ingest_defect.as_deref().unwrap().contains("registry_checks"));
        assert_eq!(rules[3].name, "C");
        assert!(rules[3].ingest_defect.is_some());
    }

    #[test]
    fn test_top_level_must_be_a_sequence() {
        assert_matches!(
            parse_rules_value(&json!({"name": "A"})),
            Err(IngestError::NotASequence { ref found }) if found == "object"
        );
        assert_matches!(parse_rules_str("not json"), Err(IngestError::InvalidJson(_)));
        assert_matches!(
            parse_rules_value(&json!("{\"a\": 1}")),
            Err(IngestError::NotASequence { .. })
        );
    }

    #[test]
    fn test_json_string_containing_array() {
        let rules = parse_rules_value(&json!("[{\"name\": \"A\", \"check_type\": \"registry\"}]")).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "A");
    }

    #[test]
    fn test_empty_set() {
        assert!(parse_rules_str("[]").unwrap().is_empty());
    }

    #[test]
    fn test_rule_limit() {
        let elements: Vec<Value> = (0..=MAX_RULES_PER_SET).map(|_| json!({})).collect();
        assert_matches!(
            parse_rules_value(&Value::Array(elements)),
            Err(IngestError::TooManyRules { .. })
        );
    }
}
