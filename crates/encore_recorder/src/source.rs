//! Seams between recorders, generated artifacts and the generator.

use crate::recordable::Recording;
use encore_core::CoreResult;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Target of a generated artifact's `load` function
pub trait Load {
    /// Bulk-import the recordings of one scope or recorder
    ///
    /// # Errors
    ///
    /// Returns error if the name was already loaded or the recordings
    /// repeat a key
    fn load(&self, name: &str, recordings: Vec<Recording>) -> CoreResult<()>;
}

/// Something the generator can serialize
pub trait RecordingSource: Send + Sync {
    /// Non-empty scopes and their recordings, ordered by scope name
    fn snapshot(&self) -> BTreeMap<String, Vec<Recording>>;

    /// Source file a scope was recorded from
    fn origin(&self, _scope: &str) -> Option<PathBuf> {
        None
    }
}
