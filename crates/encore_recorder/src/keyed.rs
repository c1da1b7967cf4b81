//! Flat, named recorder.

use crate::recordable::{Recordable, Recording};
use crate::recorder::Recorder;
use crate::registry::Registrable;
use encore_core::{CoreResult, Key};

/// Single-scope recorder registered under its own name
#[derive(Debug)]
pub struct KeyedRecorder {
    name: String,
    inner: Recorder,
}

impl KeyedRecorder {
    /// Create a recorder named `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inner: Recorder::new(),
        }
    }

    /// Recorder name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record or replay the value under `key`
    ///
    /// # Errors
    ///
    /// Returns error on a duplicate key while recording, or a missing key
    /// while replaying
    pub fn record<T: Recordable + Clone>(&self, key: impl Into<Key>, live: T) -> CoreResult<T> {
        self.inner.record(&self.name, key, live)
    }

    /// Record or replay under the next sequential key
    ///
    /// # Errors
    ///
    /// Same as [`record`](Self::record)
    pub fn record_next<T: Recordable + Clone>(&self, live: T) -> CoreResult<T> {
        self.inner.record_next(&self.name, live)
    }

    /// Recordings in insertion order
    #[must_use]
    pub fn records(&self) -> Vec<Recording> {
        self.inner.recordings(&self.name)
    }

    /// Check whether recording is enabled
    #[must_use]
    pub fn recording_enabled(&self) -> bool {
        self.inner.recording_enabled()
    }
}

impl Registrable for KeyedRecorder {
    fn name(&self) -> &str {
        &self.name
    }

    fn enable_recording(&self, enabled: bool) {
        self.inner.enable_recording(enabled);
    }

    fn load(&self, recordings: Vec<Recording>) -> CoreResult<()> {
        self.inner.load(&self.name, recordings)
    }

    fn records(&self) -> Vec<Recording> {
        KeyedRecorder::records(self)
    }

    fn reset(&self) {
        self.inner.reset();
    }
}
