//! Registry source trait
//!
//! Platform backends implement [`RegistrySource`]; everything above it
//! (reader, prechecker, evaluator) is platform-independent.

use super::errors::QueryFailure;
use super::path::RegistryPath;
use super::value::RegistryValue;

/// Read-only access to a registry
pub trait RegistrySource: Send + Sync {
    /// Query one named value; the empty name addresses the default value
    fn query_value(
        &self,
        path: &RegistryPath,
        value_name: &str,
    ) -> Result<RegistryValue, QueryFailure>;

    /// Whether the key can be opened for reading
    fn key_exists(&self, path: &RegistryPath) -> Result<bool, QueryFailure>;

    /// Identifier used in logs and reports
    fn source_id(&self) -> &str;
}

impl<S: RegistrySource + ?Sized> RegistrySource for Box<S> {
    fn query_value(
        &self,
        path: &RegistryPath,
        value_name: &str,
    ) -> Result<RegistryValue, QueryFailure> {
        (**self).query_value(path, value_name)
    }

    fn key_exists(&self, path: &RegistryPath) -> Result<bool, QueryFailure> {
        (**self).key_exists(path)
    }

    fn source_id(&self) -> &str {
        (**self).source_id()
    }
}
