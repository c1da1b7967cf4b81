//! Type-erased recorded values.

use encore_core::Key;
use encore_literal::{introspect, LiteralError, Value};
use serde::Serialize;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A value that can be recorded, replayed and serialized
///
/// Implemented for every `Serialize + Debug + Send + Sync + 'static` type.
pub trait Recordable: Any + Send + Sync + fmt::Debug {
    /// Upcast for downcasting on replay
    fn as_any(&self) -> &dyn Any;

    /// Static type name of the recorded value
    fn type_name(&self) -> &'static str;

    /// Structural shape of the value
    ///
    /// # Errors
    ///
    /// Returns error if the value's `Serialize` implementation fails
    fn introspect(&self) -> Result<Value, LiteralError>;
}

impl<T> Recordable for T
where
    T: Serialize + Any + Send + Sync + fmt::Debug,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }

    fn introspect(&self) -> Result<Value, LiteralError> {
        introspect(self)
    }
}

/// One recorded value and its key
#[derive(Debug, Clone)]
pub struct Recording {
    /// Key, unique within its scope
    pub key: Key,
    /// Recorded value
    pub value: Arc<dyn Recordable>,
}

impl Recording {
    /// Create a recording
    ///
    /// Generated artifacts name the value type explicitly
    /// (`Recording::new::<crate::Dog>(..)`) so the literal is inferred
    /// against it.
    pub fn new<V: Recordable>(key: impl Into<Key>, value: V) -> Self {
        Self {
            key: key.into(),
            value: Arc::new(value),
        }
    }

    /// Create from an already shared value
    pub fn from_shared(key: impl Into<Key>, value: Arc<dyn Recordable>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    /// Borrow the value as `T`, if it has that type
    #[must_use]
    pub fn value<T: 'static>(&self) -> Option<&T> {
        self.value.as_any().downcast_ref::<T>()
    }
}
