//! Canonical marshal capability.
//!
//! Some values carry no meaningful structure for a literal (timestamps, ids,
//! addresses). Types opt in by implementing [`Canonical`]: the value is
//! written to the artifact as its canonical text and rebuilt on load through
//! [`decode`].

use crate::error::{CoreError, CoreResult};
use serde::ser::{Error as _, Serialize, Serializer};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Newtype name marking a canonical form during serialization
pub const CANONICAL_MARKER: &str = "$encore::Canonical";

/// Paths of built-in canonical types whose serde form is their canonical text
pub const STRING_FORM_TYPES: &[&str] = &[
    "uuid::Uuid",
    "chrono::DateTime<chrono::Utc>",
    "chrono::DateTime<chrono::FixedOffset>",
    "chrono::NaiveDate",
    "chrono::NaiveDateTime",
    "chrono::NaiveTime",
    "std::net::IpAddr",
    "std::net::Ipv4Addr",
    "std::net::Ipv6Addr",
    "std::net::SocketAddr",
    "std::path::PathBuf",
];

/// Explicit capability to round-trip through a canonical text form
pub trait Canonical: Sized {
    /// Path under which generated code names this type
    const TYPE_PATH: &'static str;

    /// Encode to canonical text
    ///
    /// # Errors
    ///
    /// Returns error if the value has no canonical form
    fn canonical_encode(&self) -> Result<String, CanonicalError>;

    /// Decode from canonical text
    ///
    /// # Errors
    ///
    /// Returns error if the form does not describe a valid value
    fn canonical_decode(form: &str) -> Result<Self, CanonicalError>;
}

/// Failure reported by a [`Canonical`] implementation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct CanonicalError {
    reason: String,
}

impl CanonicalError {
    /// Create from any displayable reason
    pub fn new(reason: impl fmt::Display) -> Self {
        Self {
            reason: reason.to_string(),
        }
    }

    /// Get the reason
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// Decode a value from its canonical form
///
/// Generated artifacts call this as `encore::decode::<T>("form")?`.
///
/// # Errors
///
/// Returns [`CoreError::Decode`] if the stored form no longer matches `T`
pub fn decode<T: Canonical>(form: &str) -> CoreResult<T> {
    T::canonical_decode(form).map_err(|err| CoreError::Decode {
        type_name: T::TYPE_PATH.to_string(),
        form: form.to_string(),
        reason: err.reason,
    })
}

/// Encode a value to its canonical form
///
/// # Errors
///
/// Returns [`CoreError::Marshal`] if encoding fails
pub fn encode<T: Canonical>(value: &T) -> CoreResult<String> {
    value.canonical_encode().map_err(|err| CoreError::Marshal {
        type_name: T::TYPE_PATH.to_string(),
        reason: err.reason,
    })
}

/// Serialize a field through its canonical form
///
/// Use as `#[serde(serialize_with = "encore::canonical::serialize")]`.
/// Other serializers see the canonical text as a plain string.
///
/// # Errors
///
/// Returns the serializer's error if encoding fails
pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Canonical,
    S: Serializer,
{
    let form = value
        .canonical_encode()
        .map_err(|err| S::Error::custom(format_args!("failed to marshal {}: {err}", T::TYPE_PATH)))?;
    serializer.serialize_newtype_struct(T::TYPE_PATH, &Marked(&form))
}

/// Serialize an optional field through its canonical form
///
/// # Errors
///
/// Returns the serializer's error if encoding fails
pub fn serialize_option<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
where
    T: Canonical,
    S: Serializer,
{
    match value {
        Some(inner) => serializer.serialize_some(&Field(inner)),
        None => serializer.serialize_none(),
    }
}

struct Marked<'a>(&'a str);

impl Serialize for Marked<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_newtype_struct(CANONICAL_MARKER, self.0)
    }
}

struct Field<'a, T>(&'a T);

impl<T: Canonical> Serialize for Field<'_, T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serialize(self.0, serializer)
    }
}

macro_rules! canonical_via_str {
    ($($ty:ty => $path:literal),* $(,)?) => {
        $(
            impl Canonical for $ty {
                const TYPE_PATH: &'static str = $path;

                fn canonical_encode(&self) -> Result<String, CanonicalError> {
                    Ok(self.to_string())
                }

                fn canonical_decode(form: &str) -> Result<Self, CanonicalError> {
                    form.parse::<$ty>().map_err(CanonicalError::new)
                }
            }
        )*
    };
}

canonical_via_str! {
    uuid::Uuid => "uuid::Uuid",
    chrono::NaiveDate => "chrono::NaiveDate",
    chrono::NaiveTime => "chrono::NaiveTime",
    IpAddr => "std::net::IpAddr",
    Ipv4Addr => "std::net::Ipv4Addr",
    Ipv6Addr => "std::net::Ipv6Addr",
    SocketAddr => "std::net::SocketAddr",
}

const NAIVE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

impl Canonical for chrono::NaiveDateTime {
    const TYPE_PATH: &'static str = "chrono::NaiveDateTime";

    fn canonical_encode(&self) -> Result<String, CanonicalError> {
        Ok(self.format(NAIVE_DATETIME_FORMAT).to_string())
    }

    fn canonical_decode(form: &str) -> Result<Self, CanonicalError> {
        Self::parse_from_str(form, NAIVE_DATETIME_FORMAT).map_err(CanonicalError::new)
    }
}

impl Canonical for chrono::DateTime<chrono::Utc> {
    const TYPE_PATH: &'static str = "chrono::DateTime<chrono::Utc>";

    fn canonical_encode(&self) -> Result<String, CanonicalError> {
        Ok(self.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, true))
    }

    fn canonical_decode(form: &str) -> Result<Self, CanonicalError> {
        chrono::DateTime::parse_from_rfc3339(form)
            .map(|parsed| parsed.with_timezone(&chrono::Utc))
            .map_err(CanonicalError::new)
    }
}

impl Canonical for chrono::DateTime<chrono::FixedOffset> {
    const TYPE_PATH: &'static str = "chrono::DateTime<chrono::FixedOffset>";

    fn canonical_encode(&self) -> Result<String, CanonicalError> {
        Ok(self.to_rfc3339_opts(chrono::SecondsFormat::AutoSi, false))
    }

    fn canonical_decode(form: &str) -> Result<Self, CanonicalError> {
        Self::parse_from_rfc3339(form).map_err(CanonicalError::new)
    }
}

impl Canonical for PathBuf {
    const TYPE_PATH: &'static str = "std::path::PathBuf";

    fn canonical_encode(&self) -> Result<String, CanonicalError> {
        self.to_str()
            .map(str::to_string)
            .ok_or_else(|| CanonicalError::new("path is not valid UTF-8"))
    }

    fn canonical_decode(form: &str) -> Result<Self, CanonicalError> {
        Ok(PathBuf::from(form))
    }
}

// Seconds with a nine-digit fraction, e.g. "1.500000000s".
impl Canonical for Duration {
    const TYPE_PATH: &'static str = "std::time::Duration";

    fn canonical_encode(&self) -> Result<String, CanonicalError> {
        Ok(format!("{}.{:09}s", self.as_secs(), self.subsec_nanos()))
    }

    fn canonical_decode(form: &str) -> Result<Self, CanonicalError> {
        let body = form
            .strip_suffix('s')
            .ok_or_else(|| CanonicalError::new("missing 's' suffix"))?;
        let (secs, nanos) = body
            .split_once('.')
            .ok_or_else(|| CanonicalError::new("missing fractional seconds"))?;
        if nanos.len() != 9 {
            return Err(CanonicalError::new("fraction must have nine digits"));
        }
        let secs = secs.parse::<u64>().map_err(CanonicalError::new)?;
        let nanos = nanos.parse::<u32>().map_err(CanonicalError::new)?;
        Ok(Duration::new(secs, nanos))
    }
}
