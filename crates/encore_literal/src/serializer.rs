//! Serializer entry point.

use crate::config::LiteralConfig;
use crate::emit::{Emitter, Slot};
use crate::error::LiteralError;
use crate::expr::Expr;
use crate::introspect::introspect;
use crate::types::{PathRules, TypeExpr};
use crate::value::Value;
use serde::Serialize;
use tracing::{debug, trace};

/// Turns values into Rust source text that rebuilds them
#[derive(Debug, Clone, Default)]
pub struct Serializer {
    config: LiteralConfig,
    rules: PathRules,
}

impl Serializer {
    /// Create a serializer
    #[must_use]
    pub fn new(config: LiteralConfig) -> Self {
        let rules = config.path_rules();
        Self { config, rules }
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &LiteralConfig {
        &self.config
    }

    /// Parse a `type_name` string into a hint for generated code
    #[must_use]
    pub fn hint(&self, type_name: &str) -> Option<TypeExpr> {
        let hint = TypeExpr::parse(type_name, &self.rules);
        if hint.is_none() {
            debug!(type_name, "type cannot be named in generated code");
        }
        hint
    }

    /// Raw value tree of a serializable value
    ///
    /// # Errors
    ///
    /// Returns error if the value's `Serialize` impl fails
    pub fn introspect<T: Serialize + ?Sized>(&self, value: &T) -> Result<Value, LiteralError> {
        introspect(value)
    }

    /// Expression for an introspected value
    ///
    /// # Errors
    ///
    /// Returns error if the value has no literal representation
    pub fn value_expr(&self, value: &Value, hint: Option<&TypeExpr>) -> Result<Expr, LiteralError> {
        trace!(kind = value.kind(), hint = ?hint.map(ToString::to_string), "emitting literal");
        Emitter::new(&self.config).emit(value, Slot::root(hint))
    }

    /// Expression for a value, hinted with its static type
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be introspected or has no literal
    /// representation
    pub fn expr<T: Serialize + ?Sized>(&self, value: &T) -> Result<Expr, LiteralError> {
        let hint = self.hint(std::any::type_name::<T>());
        self.value_expr(&introspect(value)?, hint.as_ref())
    }

    /// Rendered literal for a value
    ///
    /// # Errors
    ///
    /// Returns error if the value cannot be introspected or has no literal
    /// representation
    pub fn literal<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, LiteralError> {
        Ok(self.expr(value)?.render())
    }
}

/// Render a value with the default configuration
///
/// # Errors
///
/// Returns error if the value has no literal representation
pub fn to_literal<T: Serialize + ?Sized>(value: &T) -> Result<String, LiteralError> {
    Serializer::default().literal(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_literal_defaults() {
        assert_eq!(to_literal(&Some(3u16)).unwrap(), "Some(3)");
        assert_eq!(to_literal(&Box::new(5)).unwrap(), "encore::ptr(5i32)");
    }

    #[test]
    fn test_custom_runtime_path() {
        let serializer = Serializer::new(LiteralConfig::new().with_runtime("::encore"));
        assert_eq!(serializer.literal(&Box::new(1u8)).unwrap(), "::encore::ptr(1u8)");
    }

    #[test]
    fn test_unnameable_type_has_no_hint() {
        let serializer = Serializer::default();
        assert!(serializer.hint("dyn core::fmt::Debug").is_none());
        assert!(serializer.hint("alloc::vec::Vec<u8>").is_some());
    }

    #[test]
    fn test_value_expr_without_hint() {
        let serializer = Serializer::default();
        let value = introspect(&vec![1u16, 2]).unwrap();
        assert_eq!(serializer.value_expr(&value, None).unwrap().render(), "vec![1u16, 2u16]");
    }

    #[test]
    fn test_introspect_keeps_raw_shape() {
        let value = Serializer::default().introspect(&(1u8, "a")).unwrap();
        assert_eq!(value.kind(), "tuple");
    }
}
