//! # regcheck SDK
//!
//! Platform backends and host helpers for the registry compliance checker:
//! the native Windows registry source, whitelisted identity commands and
//! current-user SID resolution.

pub mod commands;
pub mod identity;
pub mod registry;

use regcheck_base::registry::{MemoryRegistry, RegistrySource, SnapshotError};
use std::path::Path;

/// Registry source for the current host
///
/// Windows hosts read the live registry; other platforms get a source that
/// fails every query.
pub fn create_registry_source() -> Box<dyn RegistrySource> {
    #[cfg(windows)]
    {
        Box::new(registry::WindowsRegistry::new())
    }

    #[cfg(not(windows))]
    {
        Box::new(registry::UnsupportedRegistry::new())
    }
}

/// Live registry, or a JSON snapshot when one is given
pub fn select_registry_source(
    snapshot: Option<&Path>,
) -> Result<Box<dyn RegistrySource>, SnapshotError> {
    match snapshot {
        Some(path) => Ok(Box::new(MemoryRegistry::from_snapshot_file(path)?)),
        None => Ok(create_registry_source()),
    }
}
