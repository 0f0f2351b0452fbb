//! Stand-in source for hosts without a Windows registry

use regcheck_base::registry::{QueryFailure, RegistryPath, RegistrySource, RegistryValue};

const UNAVAILABLE: &str = "Windows registry is not available on this platform";

#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedRegistry;

impl UnsupportedRegistry {
    pub fn new() -> Self {
        Self
    }
}

impl RegistrySource for UnsupportedRegistry {
    fn query_value(
        &self,
        _path: &RegistryPath,
        _value_name: &str,
    ) -> Result<RegistryValue, QueryFailure> {
        Err(QueryFailure::Platform(UNAVAILABLE.to_string()))
    }

    fn key_exists(&self, _path: &RegistryPath) -> Result<bool, QueryFailure> {
        Err(QueryFailure::Platform(UNAVAILABLE.to_string()))
    }

    fn source_id(&self) -> &str {
        "unsupported"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regcheck_base::registry::RootKey;
    use regcheck_base::{ComplianceChecker, ComplianceRule, ComplianceStatus};

    #[test]
    fn test_every_query_fails() {
        let registry = UnsupportedRegistry::new();
        let path = RegistryPath::new(RootKey::LocalMachine, "Software");

        assert_eq!(
            registry.query_value(&path, "X"),
            Err(QueryFailure::Platform(UNAVAILABLE.to_string()))
        );
        assert!(registry.key_exists(&path).is_err());
    }

    #[test]
    fn test_rules_still_get_results() {
        let checker = ComplianceChecker::new(UnsupportedRegistry::new());
        let results = checker.check_rules(&[ComplianceRule::registry(
            "fw",
            "HKLM\\Software\\Policies\\Firewall",
            "Enabled",
            "1",
        )]);

        assert_eq!(results.len(), 1);
        assert_eq!(*results[0].status(), ComplianceStatus::NonCompliant);
        assert_eq!(
            results[0].current_value(),
            Some("Error reading registry: Windows registry is not available on this platform")
        );
    }
}
