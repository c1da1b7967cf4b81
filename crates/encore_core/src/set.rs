//! Unordered collection support for generated literals.
//!
//! Hashed sets iterate in a different order on every run. Fields marked
//! with [`serialize`] are emitted with their elements sorted by rendered
//! text, so regenerated artifacts stay byte-identical.

use serde::{Serialize, Serializer};

/// Newtype name marking an unordered collection during serialization
pub const SET_MARKER: &str = "$encore::Set";

/// Serialize a set field so literals sort its elements
///
/// Use as `#[serde(serialize_with = "encore::set::serialize")]` on
/// `HashSet` fields. Other serializers see the plain sequence.
///
/// # Errors
///
/// Returns the serializer's error if an element fails to serialize
pub fn serialize<C, S>(value: &C, serializer: S) -> Result<S::Ok, S::Error>
where
    C: Serialize,
    S: Serializer,
{
    serializer.serialize_newtype_struct(SET_MARKER, value)
}

/// Serialize an optional set field
///
/// # Errors
///
/// Returns the serializer's error if an element fails to serialize
pub fn serialize_option<C, S>(value: &Option<C>, serializer: S) -> Result<S::Ok, S::Error>
where
    C: Serialize,
    S: Serializer,
{
    match value {
        Some(set) => serializer.serialize_some(&Marked(set)),
        None => serializer.serialize_none(),
    }
}

struct Marked<'a, C>(&'a C);

impl<C: Serialize> Serialize for Marked<'_, C> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct(SET_MARKER, self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_serialize_helper_is_transparent_for_json() {
        #[derive(serde::Serialize)]
        struct Tags {
            #[serde(serialize_with = "serialize")]
            tags: HashSet<u8>,
            #[serde(serialize_with = "serialize_option")]
            extra: Option<HashSet<u8>>,
        }

        let tags = Tags {
            tags: HashSet::from([7]),
            extra: None,
        };
        assert_eq!(
            serde_json::to_string(&tags).unwrap(),
            r#"{"tags":[7],"extra":null}"#
        );
    }
}
