//! Registry access: path normalization, sources, value reads and presence checks

pub mod errors;
pub mod memory;
pub mod path;
pub mod presence;
pub mod reader;
pub mod source;
pub mod value;

pub use errors::{QueryFailure, ReadError, SnapshotError};
pub use memory::MemoryRegistry;
pub use path::{normalize, PathResolution, RegistryPath, RootKey};
pub use presence::PresenceChecker;
pub use reader::{target_label, RegistryReader};
pub use source::RegistrySource;
pub use value::RegistryValue;
