//! Registry of named recorders.
//!
//! Generated artifacts may be loaded before or after the recorders they
//! target are registered. Loads for names not yet registered wait in a
//! pending cache and are applied on registration, so the final content
//! does not depend on the order.

use crate::recordable::Recording;
use crate::source::{Load, RecordingSource};
use crate::sync::{lock, read, write};
use encore_core::{CoreError, CoreResult};
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tracing::debug;

/// A recorder that can be registered by name
pub trait Registrable: Any + Send + Sync + fmt::Debug {
    /// Hook run before registration; may resolve the recorder's name
    ///
    /// # Errors
    ///
    /// Returns error if the recorder cannot be initialized
    fn init(&mut self) -> CoreResult<()> {
        Ok(())
    }

    /// Registration name
    fn name(&self) -> &str;

    /// Switch between recording and replay
    fn enable_recording(&self, enabled: bool);

    /// Bulk-import recordings
    ///
    /// # Errors
    ///
    /// Returns error if the recorder was already loaded
    fn load(&self, recordings: Vec<Recording>) -> CoreResult<()>;

    /// Recordings in insertion order
    fn records(&self) -> Vec<Recording>;

    /// Drop all recordings
    fn reset(&self);
}

#[derive(Debug)]
struct Member {
    recorder: Arc<dyn Registrable>,
    any: Arc<dyn Any + Send + Sync>,
}

/// Registry of named recorders
///
/// Lock order is always members, then pending.
#[derive(Debug, Default)]
pub struct Registry {
    members: RwLock<BTreeMap<String, Member>>,
    pending: Mutex<HashMap<String, Vec<Recording>>>,
    enabled: AtomicBool,
}

impl Registry {
    /// Create an empty registry in replay mode
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a recorder
    ///
    /// Runs the recorder's `init` hook, applies the current mode and any
    /// recordings loaded for its name beforehand.
    ///
    /// # Errors
    ///
    /// Returns error if `init` fails, the name is taken, or pending
    /// recordings cannot be applied
    pub fn register<R: Registrable>(&self, mut recorder: R) -> CoreResult<Arc<R>> {
        recorder.init()?;
        let name = recorder.name().to_string();

        let mut members = write(&self.members);
        if members.contains_key(&name) {
            return Err(CoreError::DuplicateName { name });
        }
        recorder.enable_recording(self.recording_enabled());

        let mut pending = lock(&self.pending);
        if let Some(recordings) = pending.remove(&name) {
            if let Err(err) = recorder.load(recordings.clone()) {
                pending.insert(name, recordings);
                return Err(err);
            }
            debug!(name = %name, "applied pending recordings");
        }
        drop(pending);

        let recorder = Arc::new(recorder);
        let shared: Arc<dyn Registrable> = recorder.clone();
        let any: Arc<dyn Any + Send + Sync> = recorder.clone();
        members.insert(name.clone(), Member { recorder: shared, any });
        debug!(name = %name, "registered recorder");
        Ok(recorder)
    }

    /// Load recordings for a recorder, registered or not
    ///
    /// # Errors
    ///
    /// Returns error if the recorder rejects the load, or if recordings for
    /// an unregistered name are already pending
    pub fn load(&self, name: &str, recordings: Vec<Recording>) -> CoreResult<()> {
        let members = read(&self.members);
        if let Some(member) = members.get(name) {
            return member.recorder.load(recordings);
        }

        let mut pending = lock(&self.pending);
        if pending.contains_key(name) {
            return Err(CoreError::AlreadyLoaded {
                scope: name.to_string(),
            });
        }
        debug!(name, count = recordings.len(), "buffered recordings for unregistered recorder");
        pending.insert(name.to_string(), recordings);
        Ok(())
    }

    /// Switch every registered recorder, and those registered later
    pub fn enable_recording(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
        for member in read(&self.members).values() {
            member.recorder.enable_recording(enabled);
        }
    }

    /// Check whether recording is enabled
    #[must_use]
    pub fn recording_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Registered recorder by name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn Registrable>> {
        read(&self.members)
            .get(name)
            .map(|member| Arc::clone(&member.recorder))
    }

    /// Registered recorder by name, as its concrete type
    #[must_use]
    pub fn get_as<R: Registrable>(&self, name: &str) -> Option<Arc<R>> {
        read(&self.members)
            .get(name)
            .and_then(|member| Arc::clone(&member.any).downcast::<R>().ok())
    }

    /// Registered names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        read(&self.members).keys().cloned().collect()
    }

    /// Reset every registered recorder and drop pending loads
    pub fn reset(&self) {
        let members = read(&self.members);
        for member in members.values() {
            member.recorder.reset();
        }
        lock(&self.pending).clear();
    }
}

impl Load for Registry {
    fn load(&self, name: &str, recordings: Vec<Recording>) -> CoreResult<()> {
        Registry::load(self, name, recordings)
    }
}

impl RecordingSource for Registry {
    fn snapshot(&self) -> BTreeMap<String, Vec<Recording>> {
        read(&self.members)
            .iter()
            .map(|(name, member)| (name.clone(), member.recorder.records()))
            .filter(|(_, records)| !records.is_empty())
            .collect()
    }
}
