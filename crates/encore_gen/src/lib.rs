//! encore generator and runner
//!
//! Renders recorder contents into Rust modules that load them back, writes
//! those modules through a [`Sink`], and drives a test run through the
//! record/replay lifecycle with [`Session`] and [`Harness`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod generator;
pub mod identity;
pub mod logging;
pub mod runner;
pub mod sink;
mod sync;

// Re-exports
pub use config::GenerateConfig;
pub use generator::{GenOptions, Generator, Unit};
pub use identity::{CaseIdentity, TestIdentity, ThreadIdentity};
pub use runner::{Case, Harness, Report, Scope, Session};
pub use sink::{FileSink, MemorySink, Sink};
