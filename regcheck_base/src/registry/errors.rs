//! Registry access errors

/// Failure reported by a registry source for one query
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryFailure {
    #[error("key or value not found")]
    NotFound,

    #[error("access denied")]
    PermissionDenied,

    #[error("{0}")]
    Platform(String),
}

/// Typed outcome of a failed value read
///
/// `target` is the raw `key\value` as written in the rule, so messages
/// match what the rule author wrote.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    #[error("Registry key/value not found: {target}")]
    NotFound { target: String },

    #[error("Access denied to registry key: {target}")]
    PermissionDenied { target: String },

    #[error("Error reading registry: {message}")]
    Other { target: String, message: String },
}

impl ReadError {
    pub fn from_failure(failure: QueryFailure, target: impl Into<String>) -> Self {
        let target = target.into();
        match failure {
            QueryFailure::NotFound => ReadError::NotFound { target },
            QueryFailure::PermissionDenied => ReadError::PermissionDenied { target },
            QueryFailure::Platform(message) => ReadError::Other { target, message },
        }
    }

    pub fn target(&self) -> &str {
        match self {
            ReadError::NotFound { target }
            | ReadError::PermissionDenied { target }
            | ReadError::Other { target, .. } => target,
        }
    }

    pub fn code(&self) -> crate::logging::Code {
        use crate::logging::codes::registry;
        match self {
            ReadError::NotFound { .. } => registry::VALUE_NOT_FOUND,
            ReadError::PermissionDenied { .. } => registry::ACCESS_DENIED,
            ReadError::Other { .. } => registry::PLATFORM_READ_FAILURE,
        }
    }
}

/// Failure loading a registry snapshot
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("Cannot read snapshot '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Snapshot '{path}' is {size} bytes, limit is {limit}")]
    TooLarge { path: String, size: u64, limit: u64 },

    #[error("Snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Snapshot must be an object of keys, found {found}")]
    NotAnObject { found: String },

    #[error("Unsupported data for '{key}\\{value}': {reason}")]
    UnsupportedValue {
        key: String,
        value: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = ReadError::from_failure(QueryFailure::NotFound, "HKLM\\X\\V");
        assert_eq!(err.to_string(), "Registry key/value not found: HKLM\\X\\V");

        let err = ReadError::from_failure(QueryFailure::PermissionDenied, "HKLM\\SAM\\V");
        assert_eq!(err.to_string(), "Access denied to registry key: HKLM\\SAM\\V");

        let err = ReadError::from_failure(QueryFailure::Platform("code 87".into()), "HKLM\\X\\V");
        assert_eq!(err.to_string(), "Error reading registry: code 87");
        assert_eq!(err.target(), "HKLM\\X\\V");
    }
}
