//! In-memory registry source
//!
//! Backs tests and offline audits. Key paths and value names are matched
//! case-insensitively, as the Windows registry does.

use super::errors::{QueryFailure, SnapshotError};
use super::path::{normalize, RegistryPath, RootKey};
use super::source::RegistrySource;
use super::value::RegistryValue;
use crate::config::compile_time::registry::{DEFAULT_VALUE_LABEL, MAX_SNAPSHOT_FILE_SIZE};
use crate::ingest::parser::json_type_name;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::path::Path;

type KeyId = (RootKey, String);

fn key_id(path: &RegistryPath) -> KeyId {
    (path.root, path.sub_key.trim_end_matches('\\').to_lowercase())
}

fn value_id(value_name: &str) -> String {
    if value_name == DEFAULT_VALUE_LABEL {
        String::new()
    } else {
        value_name.to_lowercase()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryRegistry {
    id: String,
    keys: HashMap<KeyId, HashMap<String, RegistryValue>>,
    denied: HashSet<KeyId>,
    failing: HashMap<KeyId, String>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::with_id("memory")
    }

    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Create a key without values
    pub fn insert_key(&mut self, key: &str) -> &mut Self {
        self.keys.entry(key_id(&normalize(key).to_path())).or_default();
        self
    }

    /// Set a value, creating its key; an empty name sets the default value
    pub fn insert(&mut self, key: &str, value_name: &str, value: RegistryValue) -> &mut Self {
        self.keys
            .entry(key_id(&normalize(key).to_path()))
            .or_default()
            .insert(value_id(value_name), value);
        self
    }

    /// Every query under `key` fails with access denied
    pub fn deny_access(&mut self, key: &str) -> &mut Self {
        self.denied.insert(key_id(&normalize(key).to_path()));
        self
    }

    /// Every query under `key` fails with a platform error
    pub fn fail_key(&mut self, key: &str, message: impl Into<String>) -> &mut Self {
        self.failing
            .insert(key_id(&normalize(key).to_path()), message.into());
        self
    }

    /// Build from a JSON snapshot
    ///
    /// ```json
    /// {"HKLM\\Software\\Policies\\X": {"Enabled": 1, "Name": "on", "List": ["a", "b"]}}
    /// ```
    ///
    /// Numbers become `REG_DWORD` (or `REG_QWORD` above `u32::MAX`), arrays
    /// become `REG_MULTI_SZ`, `null` becomes `REG_NONE`. Other types use the
    /// explicit form `{"type": "REG_BINARY", "data": "0aff"}`.
    pub fn from_json_snapshot(snapshot: &Value) -> Result<Self, SnapshotError> {
        let keys = snapshot.as_object().ok_or_else(|| SnapshotError::NotAnObject {
            found: json_type_name(snapshot).to_string(),
        })?;

        let mut registry = Self::with_id("snapshot");
        for (key, values) in keys {
            registry.insert_key(key);

            let values = values.as_object().ok_or_else(|| SnapshotError::UnsupportedValue {
                key: key.clone(),
                value: String::new(),
                reason: format!("expected an object of values, found {}", json_type_name(values)),
            })?;

            for (value_name, data) in values {
                let value = snapshot_value(data).map_err(|reason| SnapshotError::UnsupportedValue {
                    key: key.clone(),
                    value: value_name.clone(),
                    reason,
                })?;
                registry.insert(key, value_name, value);
            }
        }

        Ok(registry)
    }

    /// Load a JSON snapshot file
    pub fn from_snapshot_file(path: &Path) -> Result<Self, SnapshotError> {
        let display = path.display().to_string();
        let io_error = |source| SnapshotError::Io {
            path: display.clone(),
            source,
        };

        let size = std::fs::metadata(path).map_err(io_error)?.len();
        if size > MAX_SNAPSHOT_FILE_SIZE {
            return Err(SnapshotError::TooLarge {
                path: display.clone(),
                size,
                limit: MAX_SNAPSHOT_FILE_SIZE,
            });
        }

        let text = std::fs::read_to_string(path).map_err(io_error)?;
        let snapshot: Value = serde_json::from_str(&text)?;
        let mut registry = Self::from_json_snapshot(&snapshot)?;
        registry.id = format!("snapshot:{}", display);
        Ok(registry)
    }

    fn injected_failure(&self, id: &KeyId) -> Option<QueryFailure> {
        let covers = |candidate: &KeyId| {
            candidate.0 == id.0
                && (candidate.1 == id.1
                    || candidate.1.is_empty()
                    || id.1.starts_with(&format!("{}\\", candidate.1)))
        };

        if self.denied.iter().any(covers) {
            return Some(QueryFailure::PermissionDenied);
        }

        self.failing
            .iter()
            .find(|&(candidate, _)| covers(candidate))
            .map(|(_, message)| QueryFailure::Platform(message.clone()))
    }
}

impl RegistrySource for MemoryRegistry {
    fn query_value(
        &self,
        path: &RegistryPath,
        value_name: &str,
    ) -> Result<RegistryValue, QueryFailure> {
        let id = key_id(path);
        if let Some(failure) = self.injected_failure(&id) {
            return Err(failure);
        }

        self.keys
            .get(&id)
            .and_then(|values| values.get(&value_id(value_name)))
            .cloned()
            .ok_or(QueryFailure::NotFound)
    }

    fn key_exists(&self, path: &RegistryPath) -> Result<bool, QueryFailure> {
        let id = key_id(path);
        if let Some(failure) = self.injected_failure(&id) {
            return Err(failure);
        }

        if id.1.is_empty() || self.keys.contains_key(&id) {
            return Ok(true);
        }

        // Parent keys of any stored key exist implicitly
        let prefix = format!("{}\\", id.1);
        Ok(self
            .keys
            .keys()
            .any(|(root, sub_key)| *root == id.0 && sub_key.starts_with(&prefix)))
    }

    fn source_id(&self) -> &str {
        &self.id
    }
}

fn snapshot_value(data: &Value) -> Result<RegistryValue, String> {
    match data {
        Value::Null => Ok(RegistryValue::None),
        Value::String(s) => Ok(RegistryValue::String(s.clone())),
        Value::Number(n) => match n.as_u64() {
            Some(n) => Ok(match u32::try_from(n) {
                Ok(dword) => RegistryValue::Dword(dword),
                Err(_) => RegistryValue::Qword(n),
            }),
            None => Err(format!("number {} is not an unsigned integer", n)),
        },
        Value::Array(items) => multi_string(items).map(RegistryValue::MultiString),
        Value::Object(fields) => {
            let kind = fields
                .get("type")
                .and_then(Value::as_str)
                .ok_or_else(|| "typed value needs a string 'type' field".to_string())?;
            let payload = fields.get("data").unwrap_or(&Value::Null);
            typed_value(kind, payload)
        }
        Value::Bool(_) => Err("booleans are not registry data".to_string()),
    }
}

fn typed_value(kind: &str, data: &Value) -> Result<RegistryValue, String> {
    let as_string = || {
        data.as_str()
            .map(str::to_string)
            .ok_or_else(|| format!("{} data must be a string", kind))
    };
    let as_integer = || {
        data.as_u64()
            .ok_or_else(|| format!("{} data must be an unsigned integer", kind))
    };

    match kind {
        "REG_NONE" => Ok(RegistryValue::None),
        "REG_SZ" => as_string().map(RegistryValue::String),
        "REG_EXPAND_SZ" => as_string().map(RegistryValue::ExpandString),
        "REG_MULTI_SZ" => match data {
            Value::Array(items) => multi_string(items).map(RegistryValue::MultiString),
            _ => Err("REG_MULTI_SZ data must be an array of strings".to_string()),
        },
        "REG_DWORD" => {
            let n = as_integer()?;
            u32::try_from(n)
                .map(RegistryValue::Dword)
                .map_err(|_| format!("{} does not fit in REG_DWORD", n))
        }
        "REG_QWORD" => as_integer().map(RegistryValue::Qword),
        "REG_BINARY" => decode_hex(&as_string()?).map(RegistryValue::Binary),
        other => Err(format!("unknown value type '{}'", other)),
    }
}

fn multi_string(items: &[Value]) -> Result<Vec<String>, String> {
    items
        .iter()
        .map(|item| {
            item.as_str()
                .map(str::to_string)
                .ok_or_else(|| "REG_MULTI_SZ entries must be strings".to_string())
        })
        .collect()
}

fn decode_hex(text: &str) -> Result<Vec<u8>, String> {
    let text = text.trim();
    if text.len() % 2 != 0 {
        return Err("hex data has odd length".to_string());
    }

    (0..text.len())
        .step_by(2)
        .map(|i| {
            text.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| format!("invalid hex at offset {}", i))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    fn path(raw: &str) -> RegistryPath {
        normalize(raw).to_path()
    }

    #[test]
    fn test_lookup_is_case_insensitive_and_alias_agnostic() {
        let mut registry = MemoryRegistry::new();
        registry.insert("HKLM\\Software\\Policies\\X", "Enabled", RegistryValue::Dword(1));

        let value = registry
            .query_value(&path("HKEY_LOCAL_MACHINE/software/policies/x"), "ENABLED")
            .unwrap();
        assert_eq!(value, RegistryValue::Dword(1));
    }

    #[test]
    fn test_missing_key_and_value() {
        let mut registry = MemoryRegistry::new();
        registry.insert("HKLM\\A", "V", RegistryValue::String("x".into()));

        assert_eq!(
            registry.query_value(&path("HKLM\\B"), "V"),
            Err(QueryFailure::NotFound)
        );
        assert_eq!(
            registry.query_value(&path("HKLM\\A"), "W"),
            Err(QueryFailure::NotFound)
        );
    }

    #[test]
    fn test_parent_keys_exist_implicitly() {
        let mut registry = MemoryRegistry::new();
        registry.insert_key("HKLM\\Software\\Vendor\\Product");

        assert_eq!(registry.key_exists(&path("HKLM\\Software\\Vendor")), Ok(true));
        assert_eq!(registry.key_exists(&path("HKLM\\Software\\Ven")), Ok(false));
        assert_eq!(registry.key_exists(&path("HKCU\\Software\\Vendor")), Ok(false));
    }

    #[test]
    fn test_injected_failures_cover_sub_keys() {
        let mut registry = MemoryRegistry::new();
        registry.insert("HKLM\\SAM\\Domains", "F", RegistryValue::Dword(0));
        registry.deny_access("HKLM\\SAM");
        registry.fail_key("HKLM\\Broken", "handle invalid");

        assert_eq!(
            registry.query_value(&path("HKLM\\SAM\\Domains"), "F"),
            Err(QueryFailure::PermissionDenied)
        );
        assert_eq!(
            registry.key_exists(&path("HKLM\\Broken\\Child")),
            Err(QueryFailure::Platform("handle invalid".to_string()))
        );
    }

    #[test]
    fn test_snapshot_value_kinds() {
        let snapshot = json!({
            "HKLM\\Software\\X": {
                "Name": "on",
                "Small": 1,
                "Large": 4294967296u64,
                "List": ["a", "b"],
                "Empty": null,
                "(Default)": "default",
                "Blob": {"type": "REG_BINARY", "data": "0aff"},
                "Path": {"type": "REG_EXPAND_SZ", "data": "%SystemRoot%"}
            },
            "HKCU\\Empty": {}
        });

        let registry = MemoryRegistry::from_json_snapshot(&snapshot).unwrap();
        let key = path("HKLM\\Software\\X");

        assert_eq!(registry.query_value(&key, "Small").unwrap(), RegistryValue::Dword(1));
        assert_eq!(
            registry.query_value(&key, "Large").unwrap(),
            RegistryValue::Qword(4294967296)
        );
        assert_eq!(registry.query_value(&key, "List").unwrap().to_string(), "a,b");
        assert_eq!(registry.query_value(&key, "Empty").unwrap(), RegistryValue::None);
        assert_eq!(registry.query_value(&key, "").unwrap().to_string(), "default");
        assert_eq!(registry.query_value(&key, "Blob").unwrap().to_string(), "0aff");
        assert_eq!(
            registry.query_value(&key, "Path").unwrap(),
            RegistryValue::ExpandString("%SystemRoot%".to_string())
        );
        assert_eq!(registry.key_exists(&path("HKCU\\Empty")), Ok(true));
        assert_eq!(registry.source_id(), "snapshot");
    }

    #[test]
    fn test_snapshot_rejects_bad_shapes() {
        assert_matches!(
            MemoryRegistry::from_json_snapshot(&json!([1, 2])),
            Err(SnapshotError::NotAnObject { .. })
        );
        assert_matches!(
            MemoryRegistry::from_json_snapshot(&json!({"HKLM\\X": {"V": true}})),
            Err(SnapshotError::UnsupportedValue { ref value, .. }) if value == "V"
        );
        assert_matches!(
            MemoryRegistry::from_json_snapshot(&json!({"HKLM\\X": {"V": {"type": "REG_BINARY", "data": "abc"}}})),
            Err(SnapshotError::UnsupportedValue { .. })
        );
    }

    #[test]
    fn test_snapshot_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("snapshot.json");
        std::fs::write(&file, r#"{"HKLM\\X": {"V": "1"}}"#).unwrap();

        let registry = MemoryRegistry::from_snapshot_file(&file).unwrap();
        assert!(registry.source_id().starts_with("snapshot:"));
        assert_eq!(registry.query_value(&path("HKLM\\X"), "V").unwrap().to_string(), "1");

        assert_matches!(
            MemoryRegistry::from_snapshot_file(&dir.path().join("missing.json")),
            Err(SnapshotError::Io { .. })
        );
    }
}
