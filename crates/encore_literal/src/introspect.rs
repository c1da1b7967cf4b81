//! serde-driven introspection into [`Value`].
//!
//! Any `Serialize` type is walked once through [`ValueSerializer`], which
//! records the structural category of every node. Marker newtypes written
//! by `encore_core`'s serde helpers are folded into their own variants
//! ([`Value::Pointer`], [`Value::Canonical`], [`Value::Set`]).

use crate::error::LiteralError;
use crate::value::{Float, Int, Payload, Value};
use encore_core::canonical::CANONICAL_MARKER;
use encore_core::pointer::POINTER_MARKER;
use encore_core::set::SET_MARKER;
use serde::ser::{self, Serialize};

/// Introspect a value into its structural shape
///
/// # Errors
///
/// Returns error if the value's `Serialize` implementation fails
pub fn introspect<T: Serialize + ?Sized>(value: &T) -> Result<Value, LiteralError> {
    value.serialize(ValueSerializer)
}

/// serde serializer producing [`Value`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueSerializer;

impl ser::Serializer for ValueSerializer {
    type Ok = Value;
    type Error = LiteralError;
    type SerializeSeq = SeqBuilder;
    type SerializeTuple = SeqBuilder;
    type SerializeTupleStruct = SeqBuilder;
    type SerializeTupleVariant = SeqBuilder;
    type SerializeMap = MapBuilder;
    type SerializeStruct = StructBuilder;
    type SerializeStructVariant = StructBuilder;

    fn serialize_bool(self, v: bool) -> Result<Value, LiteralError> {
        Ok(Value::Bool(v))
    }

    fn serialize_i8(self, v: i8) -> Result<Value, LiteralError> {
        Ok(Value::Int(Int::I8(v)))
    }

    fn serialize_i16(self, v: i16) -> Result<Value, LiteralError> {
        Ok(Value::Int(Int::I16(v)))
    }

    fn serialize_i32(self, v: i32) -> Result<Value, LiteralError> {
        Ok(Value::Int(Int::I32(v)))
    }

    fn serialize_i64(self, v: i64) -> Result<Value, LiteralError> {
        Ok(Value::Int(Int::I64(v)))
    }

    fn serialize_i128(self, v: i128) -> Result<Value, LiteralError> {
        Ok(Value::Int(Int::I128(v)))
    }

    fn serialize_u8(self, v: u8) -> Result<Value, LiteralError> {
        Ok(Value::Int(Int::U8(v)))
    }

    fn serialize_u16(self, v: u16) -> Result<Value, LiteralError> {
        Ok(Value::Int(Int::U16(v)))
    }

    fn serialize_u32(self, v: u32) -> Result<Value, LiteralError> {
        Ok(Value::Int(Int::U32(v)))
    }

    fn serialize_u64(self, v: u64) -> Result<Value, LiteralError> {
        Ok(Value::Int(Int::U64(v)))
    }

    fn serialize_u128(self, v: u128) -> Result<Value, LiteralError> {
        Ok(Value::Int(Int::U128(v)))
    }

    fn serialize_f32(self, v: f32) -> Result<Value, LiteralError> {
        Ok(Value::Float(Float::F32(v)))
    }

    fn serialize_f64(self, v: f64) -> Result<Value, LiteralError> {
        Ok(Value::Float(Float::F64(v)))
    }

    fn serialize_char(self, v: char) -> Result<Value, LiteralError> {
        Ok(Value::Char(v))
    }

    fn serialize_str(self, v: &str) -> Result<Value, LiteralError> {
        Ok(Value::Str(v.to_string()))
    }

    fn serialize_bytes(self, v: &[u8]) -> Result<Value, LiteralError> {
        Ok(Value::Bytes(v.to_vec()))
    }

    fn serialize_none(self) -> Result<Value, LiteralError> {
        Ok(Value::Null)
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Result<Value, LiteralError> {
        Ok(Value::Some(Box::new(value.serialize(self)?)))
    }

    fn serialize_unit(self) -> Result<Value, LiteralError> {
        Ok(Value::Unit)
    }

    fn serialize_unit_struct(self, name: &'static str) -> Result<Value, LiteralError> {
        Ok(Value::UnitStruct(name))
    }

    fn serialize_unit_variant(
        self,
        name: &'static str,
        _index: u32,
        variant: &'static str,
    ) -> Result<Value, LiteralError> {
        Ok(Value::Variant {
            enum_name: name,
            variant,
            payload: Payload::Unit,
        })
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        value: &T,
    ) -> Result<Value, LiteralError> {
        let inner = value.serialize(self)?;
        if name == POINTER_MARKER {
            return Ok(Value::Pointer(Box::new(inner)));
        }
        if name == SET_MARKER {
            return match inner {
                Value::Seq(items) => Ok(Value::Set(items)),
                other => Err(LiteralError::Marshal {
                    type_name: "set".to_string(),
                    reason: format!("expected a sequence, found {}", other.kind()),
                }),
            };
        }
        if name == CANONICAL_MARKER {
            return match inner {
                Value::Str(form) => Ok(Value::Canonical {
                    type_path: String::new(),
                    form,
                }),
                other => Err(LiteralError::Marshal {
                    type_name: "canonical value".to_string(),
                    reason: format!("expected canonical text, found {}", other.kind()),
                }),
            };
        }
        match inner {
            // The outer newtype names the type carrying the canonical form.
            Value::Canonical { type_path, form } if type_path.is_empty() => Ok(Value::Canonical {
                type_path: name.to_string(),
                form,
            }),
            inner => Ok(Value::Newtype {
                name,
                inner: Box::new(inner),
            }),
        }
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        name: &'static str,
        _index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, LiteralError> {
        Ok(Value::Variant {
            enum_name: name,
            variant,
            payload: Payload::Newtype(Box::new(value.serialize(self)?)),
        })
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqBuilder, LiteralError> {
        Ok(SeqBuilder::new(SeqKind::Seq, len.unwrap_or(0)))
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqBuilder, LiteralError> {
        Ok(SeqBuilder::new(SeqKind::Tuple, len))
    }

    fn serialize_tuple_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, LiteralError> {
        Ok(SeqBuilder::new(SeqKind::TupleStruct(name), len))
    }

    fn serialize_tuple_variant(
        self,
        name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SeqBuilder, LiteralError> {
        Ok(SeqBuilder::new(SeqKind::Variant(name, variant), len))
    }

    fn serialize_map(self, len: Option<usize>) -> Result<MapBuilder, LiteralError> {
        Ok(MapBuilder {
            entries: Vec::with_capacity(len.unwrap_or(0)),
            pending: None,
        })
    }

    fn serialize_struct(self, name: &'static str, len: usize) -> Result<StructBuilder, LiteralError> {
        Ok(StructBuilder::new(StructKind::Struct(name), len))
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<StructBuilder, LiteralError> {
        Ok(StructBuilder::new(StructKind::Variant(name, variant), len))
    }
}

#[derive(Debug)]
enum SeqKind {
    Seq,
    Tuple,
    TupleStruct(&'static str),
    Variant(&'static str, &'static str),
}

/// Builder for sequences, tuples and tuple-shaped structs and variants
#[derive(Debug)]
pub struct SeqBuilder {
    kind: SeqKind,
    items: Vec<Value>,
}

impl SeqBuilder {
    fn new(kind: SeqKind, len: usize) -> Self {
        Self {
            kind,
            items: Vec::with_capacity(len),
        }
    }

    fn push<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), LiteralError> {
        self.items.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn finish(self) -> Value {
        match self.kind {
            SeqKind::Seq => Value::Seq(self.items),
            SeqKind::Tuple => Value::Tuple(self.items),
            SeqKind::TupleStruct(name) => Value::TupleStruct {
                name,
                elems: self.items,
            },
            SeqKind::Variant(enum_name, variant) => Value::Variant {
                enum_name,
                variant,
                payload: Payload::Tuple(self.items),
            },
        }
    }
}

impl ser::SerializeSeq for SeqBuilder {
    type Ok = Value;
    type Error = LiteralError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), LiteralError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, LiteralError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTuple for SeqBuilder {
    type Ok = Value;
    type Error = LiteralError;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), LiteralError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, LiteralError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleStruct for SeqBuilder {
    type Ok = Value;
    type Error = LiteralError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), LiteralError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, LiteralError> {
        Ok(self.finish())
    }
}

impl ser::SerializeTupleVariant for SeqBuilder {
    type Ok = Value;
    type Error = LiteralError;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), LiteralError> {
        self.push(value)
    }

    fn end(self) -> Result<Value, LiteralError> {
        Ok(self.finish())
    }
}

/// Builder for maps
#[derive(Debug)]
pub struct MapBuilder {
    entries: Vec<(Value, Value)>,
    pending: Option<Value>,
}

impl ser::SerializeMap for MapBuilder {
    type Ok = Value;
    type Error = LiteralError;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Result<(), LiteralError> {
        self.pending = Some(key.serialize(ValueSerializer)?);
        Ok(())
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<(), LiteralError> {
        let key = self
            .pending
            .take()
            .ok_or_else(|| LiteralError::unsupported("map value without a key"))?;
        self.entries.push((key, value.serialize(ValueSerializer)?));
        Ok(())
    }

    fn end(self) -> Result<Value, LiteralError> {
        if self.pending.is_some() {
            return Err(LiteralError::unsupported("map key without a value"));
        }
        Ok(Value::Map(self.entries))
    }
}

#[derive(Debug)]
enum StructKind {
    Struct(&'static str),
    Variant(&'static str, &'static str),
}

/// Builder for structs and struct variants
#[derive(Debug)]
pub struct StructBuilder {
    kind: StructKind,
    fields: Vec<(&'static str, Value)>,
    skipped: bool,
}

impl StructBuilder {
    fn new(kind: StructKind, len: usize) -> Self {
        Self {
            kind,
            fields: Vec::with_capacity(len),
            skipped: false,
        }
    }

    fn finish(self) -> Value {
        match self.kind {
            StructKind::Struct(name) => Value::Struct {
                name,
                fields: self.fields,
                skipped: self.skipped,
            },
            StructKind::Variant(enum_name, variant) => Value::Variant {
                enum_name,
                variant,
                payload: Payload::Struct(self.fields),
            },
        }
    }
}

impl ser::SerializeStruct for StructBuilder {
    type Ok = Value;
    type Error = LiteralError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), LiteralError> {
        self.fields.push((key, value.serialize(ValueSerializer)?));
        Ok(())
    }

    fn skip_field(&mut self, _key: &'static str) -> Result<(), LiteralError> {
        self.skipped = true;
        Ok(())
    }

    fn end(self) -> Result<Value, LiteralError> {
        Ok(self.finish())
    }
}

impl ser::SerializeStructVariant for StructBuilder {
    type Ok = Value;
    type Error = LiteralError;

    fn serialize_field<T: Serialize + ?Sized>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), LiteralError> {
        self.fields.push((key, value.serialize(ValueSerializer)?));
        Ok(())
    }

    fn skip_field(&mut self, key: &'static str) -> Result<(), LiteralError> {
        Err(LiteralError::unsupported(format!(
            "skipped field `{key}` in an enum struct variant"
        )))
    }

    fn end(self) -> Result<Value, LiteralError> {
        Ok(self.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use std::collections::BTreeMap;

    #[derive(Serialize)]
    struct Dog {
        name: String,
        age: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    }

    #[derive(Serialize)]
    enum Shape {
        Point,
        Circle(f64),
        Rect { w: u32, h: u32 },
        Pair(i8, i8),
    }

    #[test]
    fn test_struct_fields_in_order() {
        let dog = Dog {
            name: "Lido".to_string(),
            age: 3,
            note: None,
        };
        let value = introspect(&dog).unwrap();
        assert_eq!(
            value,
            Value::Struct {
                name: "Dog",
                fields: vec![
                    ("name", Value::Str("Lido".to_string())),
                    ("age", Value::Int(Int::I64(3))),
                ],
                skipped: true,
            }
        );
    }

    #[test]
    fn test_enum_payloads() {
        assert_eq!(
            introspect(&Shape::Point).unwrap(),
            Value::Variant {
                enum_name: "Shape",
                variant: "Point",
                payload: Payload::Unit
            }
        );
        assert!(matches!(
            introspect(&Shape::Circle(1.0)).unwrap(),
            Value::Variant { payload: Payload::Newtype(_), .. }
        ));
        assert!(matches!(
            introspect(&Shape::Rect { w: 1, h: 2 }).unwrap(),
            Value::Variant { payload: Payload::Struct(ref f), .. } if f.len() == 2
        ));
        assert!(matches!(
            introspect(&Shape::Pair(1, 2)).unwrap(),
            Value::Variant { payload: Payload::Tuple(ref t), .. } if t.len() == 2
        ));
    }

    #[test]
    fn test_option_and_collections() {
        assert_eq!(introspect(&None::<i32>).unwrap(), Value::Null);
        assert_eq!(
            introspect(&Some(1u8)).unwrap(),
            Value::Some(Box::new(Value::Int(Int::U8(1))))
        );
        assert_eq!(
            introspect(&[1i32, 2]).unwrap(),
            Value::Tuple(vec![Value::Int(Int::I32(1)), Value::Int(Int::I32(2))])
        );

        let mut map = BTreeMap::new();
        map.insert("a", 1u32);
        assert_eq!(
            introspect(&map).unwrap(),
            Value::Map(vec![(Value::Str("a".to_string()), Value::Int(Int::U32(1)))])
        );
    }

    #[test]
    fn test_pointer_marker() {
        #[derive(Serialize)]
        struct Node {
            #[serde(serialize_with = "encore_core::pointer::serialize")]
            value: Box<i32>,
        }

        let value = introspect(&Node { value: Box::new(5) }).unwrap();
        match value {
            Value::Struct { fields, .. } => {
                assert_eq!(
                    fields[0].1,
                    Value::Pointer(Box::new(Value::Int(Int::I32(5))))
                );
            }
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn test_set_marker() {
        #[derive(Serialize)]
        struct Tags {
            #[serde(serialize_with = "encore_core::set::serialize")]
            tags: std::collections::HashSet<u8>,
            #[serde(serialize_with = "encore_core::set::serialize")]
            count: u8,
        }

        let value = introspect(&Tags {
            tags: [4].into(),
            count: 1,
        });
        assert!(matches!(value, Err(LiteralError::Marshal { .. })));

        #[derive(Serialize)]
        struct Only {
            #[serde(serialize_with = "encore_core::set::serialize")]
            tags: std::collections::HashSet<u8>,
        }

        match introspect(&Only { tags: [4].into() }).unwrap() {
            Value::Struct { fields, .. } => {
                assert_eq!(fields[0].1, Value::Set(vec![Value::Int(Int::U8(4))]));
            }
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn test_canonical_marker() {
        #[derive(Serialize)]
        struct Event {
            #[serde(serialize_with = "encore_core::canonical::serialize")]
            id: uuid::Uuid,
        }

        let value = introspect(&Event {
            id: uuid::Uuid::nil(),
        })
        .unwrap();
        match value {
            Value::Struct { fields, .. } => {
                assert_eq!(
                    fields[0].1,
                    Value::Canonical {
                        type_path: "uuid::Uuid".to_string(),
                        form: "00000000-0000-0000-0000-000000000000".to_string(),
                    }
                );
            }
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn test_custom_error_is_marshal() {
        struct Broken;

        impl Serialize for Broken {
            fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
                Err(serde::ser::Error::custom("lock poisoned"))
            }
        }

        assert!(matches!(
            introspect(&Broken),
            Err(LiteralError::Marshal { .. })
        ));
    }
}
