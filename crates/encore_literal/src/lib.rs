//! encore literal serializer
//!
//! Converts runtime values into Rust source text that rebuilds them when
//! compiled. A value is first introspected through its `Serialize`
//! implementation, then emitted against a type hint taken from
//! `std::any::type_name`, then laid out deterministically.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod defaults;
pub mod emit;
pub mod error;
pub mod expr;
pub mod introspect;
pub mod serializer;
pub mod types;
pub mod value;

// Re-exports
pub use config::LiteralConfig;
pub use defaults::Defaults;
pub use error::LiteralError;
pub use expr::Expr;
pub use introspect::introspect;
pub use serializer::{to_literal, Serializer};
pub use types::TypeExpr;
pub use value::Value;
