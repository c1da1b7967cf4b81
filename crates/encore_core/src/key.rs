//! Recording keys.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of a recording within a scope
///
/// Keyed recording uses names chosen by the caller; sequential recording
/// uses the scope's cursor position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Key {
    /// Caller-chosen name
    Name(String),
    /// Sequential position
    Index(u64),
}

impl Key {
    /// Get the name if this is a named key
    #[must_use]
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Name(name) => Some(name),
            Self::Index(_) => None,
        }
    }

    /// Get the position if this is a sequential key
    #[must_use]
    pub fn as_index(&self) -> Option<u64> {
        match self {
            Self::Name(_) => None,
            Self::Index(index) => Some(*index),
        }
    }

    /// Source literal that converts back into this key
    #[must_use]
    pub fn literal(&self) -> String {
        match self {
            Self::Name(name) => format!("{name:?}"),
            Self::Index(index) => format!("{index}u64"),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.write_str(name),
            Self::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&String> for Key {
    fn from(name: &String) -> Self {
        Self::Name(name.clone())
    }
}

impl From<u64> for Key {
    fn from(index: u64) -> Self {
        Self::Index(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_key_display() {
        assert_eq!(Key::from("dog1").to_string(), "dog1");
        assert_eq!(Key::from(2u64).to_string(), "2");
    }

    #[test]
    fn test_key_literal() {
        assert_eq!(Key::from("dog1").literal(), "\"dog1\"");
        assert_eq!(Key::from("say \"hi\"").literal(), r#""say \"hi\"""#);
        assert_eq!(Key::Index(0).literal(), "0u64");
    }

    #[test]
    fn test_key_accessors() {
        let name = Key::from("a".to_string());
        assert_eq!(name.as_name(), Some("a"));
        assert_eq!(name.as_index(), None);
        assert_eq!(Key::Index(3).as_index(), Some(3));
    }

    #[test]
    fn test_key_serde_untagged() {
        let json = serde_json::to_string(&vec![Key::from("a"), Key::Index(1)]).unwrap();
        assert_eq!(json, r#"["a",1]"#);
        let back: Vec<Key> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![Key::from("a"), Key::Index(1)]);
    }

    proptest::proptest! {
        #[test]
        fn prop_index_order_matches_numeric(a in any::<u64>(), b in any::<u64>()) {
            prop_assert_eq!(Key::Index(a).cmp(&Key::Index(b)), a.cmp(&b));
        }
    }
}
