//! encore
//!
//! Capture test fixtures from a live run once, then replay them
//! deterministically from a generated Rust module.
//!
//! A test records values through a [`Session`] scope. When the run records
//! (`ENCORE_RECORD=1`), every value is kept and, once all tests pass, the
//! recorder is rendered into a module of literal expressions. Later runs
//! load that module and get the stored values back instead of recomputing
//! them.
//!
//! Generated modules only use this crate's runtime surface: [`ptr`],
//! [`decode`], [`Recording`], [`Load`] and [`Result`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub use encore_core::{canonical, pointer, set};
pub use encore_core::{decode, encode, ptr, Canonical, CanonicalError, CoreError, CoreResult, Key};
pub use encore_gen::{case, logging};
pub use encore_gen::{
    CaseIdentity, FileSink, GenOptions, GenerateConfig, Generator, Harness, MemorySink, Report,
    Scope, Session, Sink, TestIdentity, ThreadIdentity, Unit,
};
pub use encore_literal::{to_literal, Defaults, LiteralConfig, Serializer};
pub use encore_recorder::record_field;
pub use encore_recorder::{
    FieldRecorder, Fixture, KeyedRecorder, Load, Recordable, Recorder, Recording,
    RecordingSource, Registrable, Registry,
};

/// Result type of generated load functions
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
