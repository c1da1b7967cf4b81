//! encore core types
//!
//! This crate holds the pieces shared by every layer of encore and by
//! generated recording artifacts: the error taxonomy, recording keys, the
//! canonical marshal capability and the pointer and set helpers.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod canonical;
pub mod error;
pub mod key;
pub mod pointer;
pub mod set;

// Re-exports
pub use canonical::{decode, encode, Canonical, CanonicalError};
pub use error::{CoreError, CoreResult};
pub use key::Key;
pub use pointer::ptr;
