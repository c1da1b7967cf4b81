//! Structural value model.
//!
//! [`Value`] is the closed set of shapes a literal can be built from. It is
//! produced by [`crate::introspect`] and consumed by [`crate::emit`].

use std::fmt;

/// Integer scalar, keeping its width and signedness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Int {
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    I128(i128),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
}

impl Int {
    /// Literal suffix for this width
    #[must_use]
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::I8(_) => "i8",
            Self::I16(_) => "i16",
            Self::I32(_) => "i32",
            Self::I64(_) => "i64",
            Self::I128(_) => "i128",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::U128(_) => "u128",
        }
    }

    /// Get the value as a byte if it is a `u8`
    #[must_use]
    pub fn as_u8(&self) -> Option<u8> {
        match self {
            Self::U8(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Int {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::I128(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::U128(v) => write!(f, "{v}"),
        }
    }
}

/// Floating point scalar
#[derive(Debug, Clone, Copy, PartialEq)]
#[allow(missing_docs)]
pub enum Float {
    F32(f32),
    F64(f64),
}

impl Float {
    /// Literal suffix for this width
    #[must_use]
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
        }
    }

    /// Bitwise equality, telling `-0.0` from `0.0` and matching NaN
    #[must_use]
    pub fn same_bits(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::F32(a), Self::F32(b)) => a.to_bits() == b.to_bits(),
            (Self::F64(a), Self::F64(b)) => a.to_bits() == b.to_bits(),
            _ => false,
        }
    }

    /// Name of the associated constant for non-finite values
    #[must_use]
    pub fn special(&self) -> Option<&'static str> {
        let v = match self {
            Self::F32(v) => f64::from(*v),
            Self::F64(v) => *v,
        };
        if v.is_nan() {
            Some("NAN")
        } else if v == f64::INFINITY {
            Some("INFINITY")
        } else if v == f64::NEG_INFINITY {
            Some("NEG_INFINITY")
        } else {
            None
        }
    }

    /// Shortest text that parses back to the same value
    #[must_use]
    pub fn digits(&self) -> String {
        match self {
            Self::F32(v) => format!("{v:?}"),
            Self::F64(v) => format!("{v:?}"),
        }
    }
}

/// Payload of an enum variant
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// `Enum::Variant`
    Unit,
    /// `Enum::Variant(value)`
    Newtype(Box<Value>),
    /// `Enum::Variant(a, b)`
    Tuple(Vec<Value>),
    /// `Enum::Variant { field: value }`
    Struct(Vec<(&'static str, Value)>),
}

impl Payload {
    fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Unit, Self::Unit) => true,
            (Self::Newtype(a), Self::Newtype(b)) => a.same_as(b),
            (Self::Tuple(a), Self::Tuple(b)) => all_same(a, b),
            (Self::Struct(a), Self::Struct(b)) => fields_same(a, b),
            _ => false,
        }
    }
}

/// A runtime value reduced to its structural category
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `None`
    Null,
    /// `()`
    Unit,
    /// Boolean
    Bool(bool),
    /// Integer of any width
    Int(Int),
    /// Float of either width
    Float(Float),
    /// Character
    Char(char),
    /// String
    Str(String),
    /// Raw bytes (`serialize_bytes`)
    Bytes(Vec<u8>),
    /// `Some(value)`
    Some(Box<Value>),
    /// Variable-length sequence
    Seq(Vec<Value>),
    /// Fixed-length tuple or array
    Tuple(Vec<Value>),
    /// Elements of an unordered collection, in iteration order
    Set(Vec<Value>),
    /// Key/value pairs in iteration order
    Map(Vec<(Value, Value)>),
    /// Struct with named fields
    Struct {
        /// Type name
        name: &'static str,
        /// Serialized fields in declaration order
        fields: Vec<(&'static str, Value)>,
        /// Whether serde skipped any field
        skipped: bool,
    },
    /// Tuple struct
    TupleStruct {
        /// Type name
        name: &'static str,
        /// Elements
        elems: Vec<Value>,
    },
    /// Unit struct
    UnitStruct(&'static str),
    /// Newtype struct
    Newtype {
        /// Type name
        name: &'static str,
        /// Wrapped value
        inner: Box<Value>,
    },
    /// Enum variant
    Variant {
        /// Enum name
        enum_name: &'static str,
        /// Variant name
        variant: &'static str,
        /// Variant payload
        payload: Payload,
    },
    /// Owning pointer to a value
    Pointer(Box<Value>),
    /// Value carried by its canonical text
    Canonical {
        /// Type path as declared by the capability
        type_path: String,
        /// Canonical text
        form: String,
    },
}

impl Value {
    /// Short description of the category, used in errors
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "none",
            Self::Unit => "unit",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Char(_) => "char",
            Self::Str(_) => "string",
            Self::Bytes(_) => "bytes",
            Self::Some(_) => "option",
            Self::Seq(_) => "sequence",
            Self::Tuple(_) => "tuple",
            Self::Set(_) => "set",
            Self::Map(_) => "map",
            Self::Struct { .. } => "struct",
            Self::TupleStruct { .. } => "tuple struct",
            Self::UnitStruct(_) => "unit struct",
            Self::Newtype { .. } => "newtype struct",
            Self::Variant { .. } => "enum variant",
            Self::Pointer(_) => "pointer",
            Self::Canonical { .. } => "canonical value",
        }
    }

    /// Structural identity
    ///
    /// Like `==`, except floats compare by their bits. A field is only
    /// left to `Default` when it is identical to the default's field.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Float(a), Self::Float(b)) => a.same_bits(b),
            (Self::Some(a), Self::Some(b)) | (Self::Pointer(a), Self::Pointer(b)) => a.same_as(b),
            (Self::Seq(a), Self::Seq(b))
            | (Self::Tuple(a), Self::Tuple(b))
            | (Self::Set(a), Self::Set(b)) => all_same(a, b),
            (Self::Map(a), Self::Map(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka.same_as(kb) && va.same_as(vb))
            }
            (
                Self::Struct {
                    name: na,
                    fields: fa,
                    skipped: sa,
                },
                Self::Struct {
                    name: nb,
                    fields: fb,
                    skipped: sb,
                },
            ) => na == nb && sa == sb && fields_same(fa, fb),
            (
                Self::TupleStruct { name: na, elems: ea },
                Self::TupleStruct { name: nb, elems: eb },
            ) => na == nb && all_same(ea, eb),
            (Self::Newtype { name: na, inner: ia }, Self::Newtype { name: nb, inner: ib }) => {
                na == nb && ia.same_as(ib)
            }
            (
                Self::Variant {
                    enum_name: ea,
                    variant: va,
                    payload: pa,
                },
                Self::Variant {
                    enum_name: eb,
                    variant: vb,
                    payload: pb,
                },
            ) => ea == eb && va == vb && pa.same_as(pb),
            _ => self == other,
        }
    }

    /// Collect the bytes of a sequence made only of `u8` values
    #[must_use]
    pub fn as_byte_seq(&self) -> Option<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Some(bytes.clone()),
            Self::Seq(items) if !items.is_empty() => items
                .iter()
                .map(|item| match item {
                    Self::Int(i) => i.as_u8(),
                    _ => None,
                })
                .collect(),
            _ => None,
        }
    }
}

fn all_same(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_as(y))
}

fn fields_same(a: &[(&'static str, Value)], b: &[(&'static str, Value)]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|((na, va), (nb, vb))| na == nb && va.same_as(vb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_int_suffix_and_display() {
        assert_eq!(Int::I64(-9).to_string(), "-9");
        assert_eq!(Int::U128(u128::MAX).suffix(), "u128");
    }

    #[test]
    fn test_float_special() {
        assert_eq!(Float::F64(f64::NAN).special(), Some("NAN"));
        assert_eq!(Float::F32(f32::NEG_INFINITY).special(), Some("NEG_INFINITY"));
        assert_eq!(Float::F64(1.5).special(), None);
        assert_eq!(Float::F64(1.0).digits(), "1.0");
        assert!(Float::F64(f64::NAN).same_bits(&Float::F64(f64::NAN)));
        assert!(!Float::F64(-0.0).same_bits(&Float::F64(0.0)));
        assert!(!Float::F32(1.0).same_bits(&Float::F64(1.0)));
    }

    #[test]
    fn test_same_as_compares_structure() {
        let dog = |age: i64| Value::Struct {
            name: "Dog",
            fields: vec![("name", Value::Str("Lido".to_string())), ("age", Value::Int(Int::I64(age)))],
            skipped: false,
        };
        assert!(dog(3).same_as(&dog(3)));
        assert!(!dog(3).same_as(&dog(4)));

        let weight = |w: f64| Value::Newtype {
            name: "Kg",
            inner: Box::new(Value::Float(Float::F64(w))),
        };
        assert!(weight(f64::NAN).same_as(&weight(f64::NAN)));
        assert!(!weight(-0.0).same_as(&weight(0.0)));
    }

    #[test]
    fn test_same_as_variants_and_kinds() {
        let variant = |payload| Value::Variant {
            enum_name: "Breed",
            variant: "Terrier",
            payload,
        };
        assert!(variant(Payload::Unit).same_as(&variant(Payload::Unit)));
        assert!(!variant(Payload::Unit).same_as(&variant(Payload::Tuple(vec![]))));
        assert!(!Value::Seq(vec![]).same_as(&Value::Set(vec![])));
        assert_eq!(Value::Set(vec![]).kind(), "set");
    }

    #[test]
    fn test_as_byte_seq() {
        let v = Value::Seq(vec![Value::Int(Int::U8(104)), Value::Int(Int::U8(105))]);
        assert_eq!(v.as_byte_seq(), Some(b"hi".to_vec()));
        let v = Value::Seq(vec![Value::Int(Int::U8(1)), Value::Int(Int::I32(2))]);
        assert_eq!(v.as_byte_seq(), None);
        assert_eq!(Value::Seq(vec![]).as_byte_seq(), None);
    }
}
