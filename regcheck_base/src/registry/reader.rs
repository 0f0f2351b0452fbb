//! Registry value reader
//!
//! Resolves a raw path, queries one value and returns its uniform string
//! form. Backend failures come back as [`ReadError`] data.

use super::errors::ReadError;
use super::path::normalize;
use super::source::RegistrySource;
use crate::config::compile_time::registry::DEFAULT_VALUE_LABEL;
use crate::logging::codes;
use crate::{log_debug, log_warning};

/// `key\value` as written by the rule author
pub fn target_label(raw_path: &str, value_name: &str) -> String {
    if value_name.is_empty() {
        format!("{}\\{}", raw_path, DEFAULT_VALUE_LABEL)
    } else {
        format!("{}\\{}", raw_path, value_name)
    }
}

pub struct RegistryReader<'a, S: RegistrySource + ?Sized> {
    source: &'a S,
}

impl<'a, S: RegistrySource + ?Sized> RegistryReader<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Read `value_name` under `raw_path`; the empty name reads the default value
    pub fn read_value(&self, raw_path: &str, value_name: &str) -> Result<String, ReadError> {
        let resolution = normalize(raw_path);
        if resolution.is_defaulted() {
            log_warning!(
                codes::registry::ROOT_KEY_DEFAULTED,
                "Registry path has no recognized root key, using HKEY_LOCAL_MACHINE",
                "path" => raw_path
            );
        }

        let path = resolution.to_path();
        log_debug!("Querying registry value",
            "path" => &path,
            "value" => value_name,
            "source" => self.source.source_id()
        );

        self.source
            .query_value(&path, value_name)
            .map(|value| value.to_string())
            .map_err(|failure| ReadError::from_failure(failure, target_label(raw_path, value_name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{MemoryRegistry, RegistryValue};
    use assert_matches::assert_matches;

    fn registry() -> MemoryRegistry {
        let mut registry = MemoryRegistry::new();
        registry
            .insert("HKLM\\Software\\X", "Level", RegistryValue::Dword(2))
            .insert("HKLM\\Software\\X", "", RegistryValue::String("default".into()))
            .insert("HKCU\\Desktop", "Wallpaper", RegistryValue::String("a.bmp".into()))
            .deny_access("HKLM\\SAM")
            .fail_key("HKLM\\Broken", "The handle is invalid.");
        registry
    }

    #[test]
    fn test_reads_stringified_value() {
        let registry = registry();
        let reader = RegistryReader::new(&registry);

        assert_eq!(reader.read_value("HKLM\\Software\\X", "Level").unwrap(), "2");
        assert_eq!(reader.read_value("HKCU/Desktop", "Wallpaper").unwrap(), "a.bmp");
        assert_eq!(reader.read_value("HKLM\\Software\\X", "").unwrap(), "default");
    }

    #[test]
    fn test_unrecognized_root_reads_local_machine() {
        let registry = registry();
        let reader = RegistryReader::new(&registry);

        assert_eq!(reader.read_value("Software\\X", "Level").unwrap(), "2");
    }

    #[test]
    fn test_errors_carry_raw_target() {
        let registry = registry();
        let reader = RegistryReader::new(&registry);

        let err = reader.read_value("HKLM\\X", "V").unwrap_err();
        assert_eq!(err.to_string(), "Registry key/value not found: HKLM\\X\\V");

        assert_matches!(
            reader.read_value("HKLM\\SAM\\Domains", "F"),
            Err(ReadError::PermissionDenied { ref target }) if target == "HKLM\\SAM\\Domains\\F"
        );
        assert_matches!(
            reader.read_value("HKLM\\Broken", ""),
            Err(ReadError::Other { ref target, ref message })
                if target == "HKLM\\Broken\\(Default)" && message == "The handle is invalid."
        );
    }
}
