//! Advisory key presence check

use super::path::normalize;
use super::source::RegistrySource;
use crate::log_debug;

pub struct PresenceChecker<'a, S: RegistrySource + ?Sized> {
    source: &'a S,
}

impl<'a, S: RegistrySource + ?Sized> PresenceChecker<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Whether the key behind `raw_path` exists; any failure counts as absent
    pub fn exists(&self, raw_path: &str) -> bool {
        let path = normalize(raw_path).to_path();
        match self.source.key_exists(&path) {
            Ok(exists) => exists,
            Err(failure) => {
                log_debug!("Presence check failed", "path" => &path, "error" => failure);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::MemoryRegistry;

    #[test]
    fn test_exists() {
        let mut registry = MemoryRegistry::new();
        registry.insert_key("HKLM\\Software\\Policies\\X").deny_access("HKLM\\SAM");
        let checker = PresenceChecker::new(&registry);

        assert!(checker.exists("HKLM\\Software\\Policies\\X"));
        assert!(checker.exists("HKEY_LOCAL_MACHINE/Software/Policies"));
        assert!(!checker.exists("HKLM\\Software\\Policies\\Y"));
        assert!(!checker.exists("HKLM\\SAM\\Domains"));
    }
}
