//! encore recorder
//!
//! The record/replay protocol. A [`Recorder`] stores values per scope under
//! keyed or sequential keys; [`KeyedRecorder`] and [`FieldRecorder`] are
//! flat single-scope variants that a [`Registry`] tracks by name.
//! Generated artifacts feed recordings back through the [`Load`] seam and
//! the generator reads them through [`RecordingSource`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod field;
pub mod keyed;
pub mod recordable;
pub mod recorder;
pub mod registry;
pub mod source;
pub mod store;
mod sync;

// Re-exports
pub use field::{FieldRecorder, Fixture};
pub use keyed::KeyedRecorder;
pub use recordable::{Recordable, Recording};
pub use recorder::Recorder;
pub use registry::{Registrable, Registry};
pub use source::{Load, RecordingSource};
pub use store::ScopeStore;
