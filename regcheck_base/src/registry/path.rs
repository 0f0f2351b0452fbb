//! Registry path normalization
//!
//! Maps human-written paths such as `HKLM/Software/Policies` onto a root
//! hive and a backslash-separated sub key.

use std::fmt;

/// Root hives a rule may address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RootKey {
    LocalMachine,
    CurrentUser,
    Users,
    ClassesRoot,
}

impl RootKey {
    /// Canonical long name
    pub fn as_str(&self) -> &'static str {
        match self {
            RootKey::LocalMachine => "HKEY_LOCAL_MACHINE",
            RootKey::CurrentUser => "HKEY_CURRENT_USER",
            RootKey::Users => "HKEY_USERS",
            RootKey::ClassesRoot => "HKEY_CLASSES_ROOT",
        }
    }
}

impl fmt::Display for RootKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recognized prefixes, longest first so the longest match wins
const ROOT_PREFIXES: &[(&str, RootKey)] = &[
    ("HKEY_LOCAL_MACHINE", RootKey::LocalMachine),
    ("HKEY_CURRENT_USER", RootKey::CurrentUser),
    ("HKEY_CLASSES_ROOT", RootKey::ClassesRoot),
    ("HKEY_USERS", RootKey::Users),
    ("HKLM", RootKey::LocalMachine),
    ("HKCU", RootKey::CurrentUser),
    ("HKU", RootKey::Users),
];

/// Root used when a path carries no recognized prefix
pub const DEFAULT_ROOT: RootKey = RootKey::LocalMachine;

/// Canonical (root, sub key) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RegistryPath {
    pub root: RootKey,
    pub sub_key: String,
}

impl RegistryPath {
    pub fn new(root: RootKey, sub_key: impl Into<String>) -> Self {
        Self {
            root,
            sub_key: sub_key.into(),
        }
    }
}

impl fmt::Display for RegistryPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sub_key.is_empty() {
            write!(f, "{}", self.root)
        } else {
            write!(f, "{}\\{}", self.root, self.sub_key)
        }
    }
}

/// Result of normalizing a raw path
///
/// An unrecognized prefix is not an error, but callers can tell it apart
/// from an explicitly addressed hive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathResolution {
    Recognized { root: RootKey, sub_key: String },
    DefaultedUnrecognized { sub_key: String },
}

impl PathResolution {
    pub fn root(&self) -> RootKey {
        match self {
            PathResolution::Recognized { root, .. } => *root,
            PathResolution::DefaultedUnrecognized { .. } => DEFAULT_ROOT,
        }
    }

    pub fn sub_key(&self) -> &str {
        match self {
            PathResolution::Recognized { sub_key, .. }
            | PathResolution::DefaultedUnrecognized { sub_key } => sub_key,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, PathResolution::DefaultedUnrecognized { .. })
    }

    pub fn to_path(&self) -> RegistryPath {
        RegistryPath::new(self.root(), self.sub_key())
    }
}

/// Normalize a raw registry path
///
/// `/` becomes `\`; the longest case-sensitive root prefix followed by a
/// separator (or the end of input) is stripped together with one separator.
pub fn normalize(path: &str) -> PathResolution {
    let unified = path.replace('/', "\\");

    for (prefix, root) in ROOT_PREFIXES {
        let Some(rest) = unified.strip_prefix(prefix) else {
            continue;
        };

        if rest.is_empty() {
            return PathResolution::Recognized {
                root: *root,
                sub_key: String::new(),
            };
        }

        if let Some(sub_key) = rest.strip_prefix('\\') {
            return PathResolution::Recognized {
                root: *root,
                sub_key: sub_key.to_string(),
            };
        }
    }

    PathResolution::DefaultedUnrecognized { sub_key: unified }
}
