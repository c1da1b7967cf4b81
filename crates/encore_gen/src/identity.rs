//! Test identity resolution.
//!
//! A scope is named after the test that records into it. Artifacts split by
//! file also need the source file the test lives in.

use std::path::PathBuf;

/// Resolves the current test's scope name and source file
pub trait TestIdentity {
    /// Stable scope name
    fn scope(&self) -> String;

    /// Source file of the test, if known
    fn origin(&self) -> Option<PathBuf>;
}

/// Identity given explicitly, usually as a name plus `file!()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseIdentity {
    name: String,
    file: PathBuf,
}

impl CaseIdentity {
    /// Create an identity
    pub fn new(name: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
        }
    }
}

impl TestIdentity for CaseIdentity {
    fn scope(&self) -> String {
        self.name.clone()
    }

    fn origin(&self) -> Option<PathBuf> {
        Some(self.file.clone())
    }
}

/// Identity taken from the current thread's name
///
/// libtest names each test thread after the test path
/// (`tests::dogs::kv_example`). The last path segment is the scope.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadIdentity;

impl TestIdentity for ThreadIdentity {
    fn scope(&self) -> String {
        let thread = std::thread::current();
        let name = thread.name().unwrap_or("unnamed");
        name.rsplit("::").next().unwrap_or(name).to_string()
    }

    fn origin(&self) -> Option<PathBuf> {
        None
    }
}
