//! Rule file loading and directory discovery

use super::errors::IngestError;
use super::parser::parse_rules_str;
use crate::config::compile_time::ingest::{MAX_RULES_PER_SET, MAX_RULE_FILE_SIZE};
use crate::logging::codes;
use crate::types::ComplianceRule;
use crate::{log_debug, log_error, log_success};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Read and parse one rule file, enforcing the size limit
pub fn load_rule_file(path: &Path) -> Result<Vec<ComplianceRule>, IngestError> {
    let metadata = fs::metadata(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    if metadata.len() > MAX_RULE_FILE_SIZE {
        return Err(IngestError::FileTooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            limit: MAX_RULE_FILE_SIZE,
        });
    }

    let text = fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    log_debug!("Parsing rule file", "file" => path.display(), "bytes" => metadata.len());
    parse_rules_str(&text)
}

/// `.json` files under `dir`, recursively, in sorted path order
pub fn discover_rule_files(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(|e| IngestError::Io {
            path: e.path().map(Path::to_path_buf).unwrap_or_else(|| dir.to_path_buf()),
            source: e
                .into_io_error()
                .unwrap_or_else(|| std::io::Error::other("directory loop detected")),
        })?;

        let is_json = entry
            .path()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if entry.file_type().is_file() && is_json {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

/// Load rules from a file, or from every rule file in a directory
pub fn load_rules(path: &Path) -> Result<Vec<ComplianceRule>, IngestError> {
    let result = load_rules_inner(path);

    match &result {
        Ok(rules) => log_success!(
            codes::success::RULES_LOADED,
            "Rules loaded",
            "path" => path.display(),
            "rules" => rules.len()
        ),
        Err(e) => log_error!(e.code(), &e.to_string(), "path" => path.display()),
    }

    result
}

fn load_rules_inner(path: &Path) -> Result<Vec<ComplianceRule>, IngestError> {
    if !path.is_dir() {
        return load_rule_file(path);
    }

    let files = discover_rule_files(path)?;
    if files.is_empty() {
        return Err(IngestError::NoRuleFiles {
            path: path.to_path_buf(),
        });
    }

    let mut rules = Vec::new();
    for file in &files {
        rules.extend(load_rule_file(file)?);
        if rules.len() > MAX_RULES_PER_SET {
            return Err(IngestError::TooManyRules {
                count: rules.len(),
                limit: MAX_RULES_PER_SET,
            });
        }
    }

    Ok(rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::fs;
    use tempfile::TempDir;

    const RULE: &str = r#"[{"name": "A", "check_type": "registry", "registry_key": "HKLM\\X", "value_name": "V", "expected_value": "1"}]"#;

    #[test]
    fn test_load_single_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("rules.json");
        fs::write(&file, RULE).unwrap();

        let rules = load_rules(&file).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].registry_key.as_deref(), Some("HKLM\\X"));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        assert_matches!(
            load_rules(&dir.path().join("absent.json")),
            Err(IngestError::FileNotFound { .. })
        );
    }

    #[test]
    fn test_directory_is_walked_in_sorted_order() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("b.json"), RULE.replace("\"A\"", "\"B\"")).unwrap();
        fs::write(dir.path().join("a.json"), RULE).unwrap();
        fs::write(dir.path().join("nested").join("c.JSON"), RULE.replace("\"A\"", "\"C\"")).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let files = discover_rule_files(dir.path()).unwrap();
        assert_eq!(files.len(), 3);

        let names: Vec<String> = load_rules(dir.path())
            .unwrap()
            .into_iter()
            .map(|rule| rule.name)
            .collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        assert_matches!(load_rules(dir.path()), Err(IngestError::NoRuleFiles { .. }));
    }

    #[test]
    fn test_invalid_file_fails_whole_load() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.json"), RULE).unwrap();
        fs::write(dir.path().join("b.json"), r#"{"name": "not a list"}"#).unwrap();

        assert_matches!(load_rules(dir.path()), Err(IngestError::NotASequence { .. }));
    }
}
