//! Core error types for encore.
//!
//! Every failure in the record/replay protocol is unrecoverable for the unit
//! of work it happens in (one test scope, or one generation pass), so errors
//! carry enough context to name the scope, key or type involved.

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// A recorder with the same name is already registered
    #[error("recorder already registered: {name}")]
    DuplicateName {
        /// Recorder name
        name: String,
    },

    /// Key recorded twice in one scope while recording
    #[error("recording with key '{key}' already exists in scope '{scope}'")]
    DuplicateKey {
        /// Scope name
        scope: String,
        /// Rendered key
        key: String,
    },

    /// Key missing from a scope during replay
    #[error("recording with key '{key}' not found in scope '{scope}'")]
    Lookup {
        /// Scope name
        scope: String,
        /// Rendered key
        key: String,
    },

    /// Scope bulk-loaded more than once
    #[error("recordings already loaded for scope '{scope}'")]
    AlreadyLoaded {
        /// Scope name
        scope: String,
    },

    /// Value has no literal representation
    #[error("no literal representation for {kind}")]
    UnsupportedKind {
        /// Description of the offending shape
        kind: String,
    },

    /// Canonical encoding failed
    #[error("failed to marshal {type_name}: {reason}")]
    Marshal {
        /// Type being marshaled
        type_name: String,
        /// Failure reason
        reason: String,
    },

    /// Stored form no longer matches the target type
    #[error("failed to decode {type_name} from {form:?}: {reason}")]
    Decode {
        /// Target type
        type_name: String,
        /// Stored form (canonical text or recorded type)
        form: String,
        /// Failure reason
        reason: String,
    },

    /// Field binding against a field the fixture does not track
    #[error("field '{field}' is not tracked by fixture '{fixture}'")]
    UnknownField {
        /// Fixture name
        fixture: String,
        /// Field name
        field: String,
    },

    /// Invalid configuration value
    #[error("invalid configuration for {field}: {reason}")]
    Config {
        /// Configuration field
        field: String,
        /// Failure reason
        reason: String,
    },

    /// I/O failure while writing or reading artifacts
    #[error("I/O error on {path}: {reason}")]
    Io {
        /// Path involved
        path: String,
        /// Failure reason
        reason: String,
    },
}

impl CoreError {
    /// Build an I/O error for a path
    #[must_use]
    pub fn io(path: impl AsRef<std::path::Path>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            reason: err.to_string(),
        }
    }

    /// Check whether this error comes from replaying against missing data
    #[must_use]
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::Lookup { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::DuplicateKey {
            scope: "kv_example".to_string(),
            key: "dog1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "recording with key 'dog1' already exists in scope 'kv_example'"
        );

        let err = CoreError::Lookup {
            scope: "kv_example".to_string(),
            key: "dog3".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "recording with key 'dog3' not found in scope 'kv_example'"
        );
        assert!(err.is_lookup());
    }

    #[test]
    fn test_decode_error_quotes_form() {
        let err = CoreError::Decode {
            type_name: "uuid::Uuid".to_string(),
            form: "not-a-uuid".to_string(),
            reason: "invalid length".to_string(),
        };
        let s = err.to_string();
        assert!(s.contains("\"not-a-uuid\""));
        assert!(s.contains("uuid::Uuid"));
    }

    #[test]
    fn test_io_error_names_path() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = CoreError::io("/tmp/recordings.rs", &io);
        assert!(err.to_string().contains("/tmp/recordings.rs"));
        assert!(!err.is_lookup());
    }

    #[test]
    fn test_error_equality() {
        let a = CoreError::AlreadyLoaded {
            scope: "s".to_string(),
        };
        let b = CoreError::AlreadyLoaded {
            scope: "s".to_string(),
        };
        assert_eq!(a, b);
        assert_ne!(
            a,
            CoreError::DuplicateName {
                name: "s".to_string()
            }
        );
    }
}
