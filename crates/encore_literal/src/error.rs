//! Serializer errors.

use encore_core::CoreError;
use std::fmt;

/// Error raised while turning a value into a literal
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LiteralError {
    /// Shape has no literal representation
    #[error("no literal representation for {0}")]
    UnsupportedKind(String),

    /// Marshal capability failed
    #[error("failed to marshal {type_name}: {reason}")]
    Marshal {
        /// Type being marshaled
        type_name: String,
        /// Failure reason
        reason: String,
    },
}

impl LiteralError {
    /// Build an unsupported-kind error
    pub fn unsupported(kind: impl fmt::Display) -> Self {
        Self::UnsupportedKind(kind.to_string())
    }
}

impl serde::ser::Error for LiteralError {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Self::Marshal {
            type_name: "value".to_string(),
            reason: msg.to_string(),
        }
    }
}

impl From<LiteralError> for CoreError {
    fn from(err: LiteralError) -> Self {
        match err {
            LiteralError::UnsupportedKind(kind) => CoreError::UnsupportedKind { kind },
            LiteralError::Marshal { type_name, reason } => CoreError::Marshal { type_name, reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;

    #[test]
    fn test_custom_is_marshal() {
        let err = LiteralError::custom("mutex poisoned");
        assert_eq!(err.to_string(), "failed to marshal value: mutex poisoned");
    }

    #[test]
    fn test_into_core_error() {
        let core: CoreError = LiteralError::unsupported("struct name `a-b`").into();
        assert_eq!(
            core,
            CoreError::UnsupportedKind {
                kind: "struct name `a-b`".to_string()
            }
        );
    }
}
