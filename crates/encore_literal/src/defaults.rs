//! Registered `Default` values.
//!
//! A struct literal may end in `..Default::default()` only when every field
//! it leaves out holds exactly what the type's `Default` produces. The
//! table keeps the introspected default of each registered struct, keyed by
//! its serde name, so emission can compare field by field.

use crate::error::LiteralError;
use crate::introspect::introspect;
use crate::value::Value;
use serde::Serialize;
use std::collections::BTreeMap;

/// Introspected `Default` values of struct types
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Defaults {
    structs: BTreeMap<&'static str, Vec<(&'static str, Value)>>,
}

impl Defaults {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the `Default` value of a struct type
    ///
    /// # Errors
    ///
    /// Returns error if the default fails to serialize or is not a struct
    /// with named fields
    pub fn insert<T: Default + Serialize>(&mut self) -> Result<(), LiteralError> {
        match introspect(&T::default())? {
            Value::Struct { name, fields, .. } => {
                self.structs.insert(name, fields);
                Ok(())
            }
            other => Err(LiteralError::unsupported(format!(
                "default of `{}` is a {}, not a struct",
                std::any::type_name::<T>(),
                other.kind()
            ))),
        }
    }

    /// Check whether a struct has a registered default
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.structs.contains_key(name)
    }

    /// Default value of one field, if its struct is registered and the
    /// default serializes that field
    #[must_use]
    pub fn field(&self, name: &str, field: &str) -> Option<&Value> {
        self.structs
            .get(name)?
            .iter()
            .find(|(candidate, _)| *candidate == field)
            .map(|(_, value)| value)
    }

    /// Number of registered structs
    #[must_use]
    pub fn len(&self) -> usize {
        self.structs.len()
    }

    /// Check whether no struct is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.structs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Int;

    #[derive(Debug, Serialize)]
    struct Kennel {
        name: String,
        capacity: u32,
    }

    impl Default for Kennel {
        fn default() -> Self {
            Self {
                name: String::new(),
                capacity: 10,
            }
        }
    }

    #[derive(Debug, Default, Serialize)]
    struct Count(u32);

    #[test]
    fn test_insert_keeps_custom_default() {
        let mut defaults = Defaults::new();
        defaults.insert::<Kennel>().unwrap();
        assert!(defaults.contains("Kennel"));
        assert_eq!(
            defaults.field("Kennel", "capacity"),
            Some(&Value::Int(Int::U32(10)))
        );
        assert_eq!(defaults.field("Kennel", "owner"), None);
        assert_eq!(defaults.field("Dog", "name"), None);
    }

    #[test]
    fn test_insert_rejects_non_struct() {
        let mut defaults = Defaults::new();
        let err = defaults.insert::<Count>().unwrap_err();
        assert!(matches!(err, LiteralError::UnsupportedKind(_)));
        assert!(defaults.is_empty());
    }
}
