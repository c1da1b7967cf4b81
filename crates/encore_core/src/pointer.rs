//! Pointer support for generated literals.
//!
//! Literals cannot be boxed in place, so artifacts wrap pointees in
//! [`ptr`], which builds any smart pointer that converts from its pointee.

use serde::{Serialize, Serializer};
use std::ops::Deref;

/// Newtype name marking an owning pointer during serialization
pub const POINTER_MARKER: &str = "$encore::Pointer";

/// Build a pointer (`Box`, `Rc`, `Arc`) from its pointee
#[must_use]
pub fn ptr<P, T>(value: T) -> P
where
    P: From<T>,
{
    P::from(value)
}

/// Serialize a pointer field so literals keep the indirection
///
/// Use as `#[serde(serialize_with = "encore::pointer::serialize")]` on
/// `Box`, `Rc` or `Arc` fields. Other serializers see the pointee.
///
/// # Errors
///
/// Returns the serializer's error if the pointee fails to serialize
pub fn serialize<P, S>(value: &P, serializer: S) -> Result<S::Ok, S::Error>
where
    P: Deref,
    P::Target: Serialize,
    S: Serializer,
{
    serializer.serialize_newtype_struct(POINTER_MARKER, &**value)
}

/// Serialize an optional pointer field
///
/// # Errors
///
/// Returns the serializer's error if the pointee fails to serialize
pub fn serialize_option<P, S>(value: &Option<P>, serializer: S) -> Result<S::Ok, S::Error>
where
    P: Deref,
    P::Target: Serialize,
    S: Serializer,
{
    match value {
        Some(pointer) => serializer.serialize_some(&Marked(&**pointer)),
        None => serializer.serialize_none(),
    }
}

struct Marked<'a, T: ?Sized>(&'a T);

impl<T: Serialize + ?Sized> Serialize for Marked<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct(POINTER_MARKER, self.0)
    }
}
