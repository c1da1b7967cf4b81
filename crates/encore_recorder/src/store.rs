//! Per-scope recording storage.

use crate::recordable::{Recordable, Recording};
use encore_core::{CoreError, CoreResult, Key};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Recordings of one scope in insertion order
#[derive(Debug, Default)]
pub struct ScopeStore {
    entries: IndexMap<Key, Arc<dyn Recordable>>,
    cursor: u64,
    loaded: bool,
    origin: Option<PathBuf>,
}

impl ScopeStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recordings
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check whether the store holds no recordings
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Take the next sequential key
    pub fn next_key(&mut self) -> Key {
        let key = Key::Index(self.cursor);
        self.cursor += 1;
        key
    }

    /// Current cursor position
    #[must_use]
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// Insert a new recording
    ///
    /// # Errors
    ///
    /// Returns error if the key is already present
    pub fn insert(&mut self, scope: &str, key: Key, value: Arc<dyn Recordable>) -> CoreResult<()> {
        if self.entries.contains_key(&key) {
            return Err(CoreError::DuplicateKey {
                scope: scope.to_string(),
                key: key.to_string(),
            });
        }
        self.entries.insert(key, value);
        Ok(())
    }

    /// Look up a recording and clone it out as `T`
    ///
    /// # Errors
    ///
    /// Returns error if the key is missing or was recorded with another type
    pub fn replay<T: Clone + 'static>(&self, scope: &str, key: &Key) -> CoreResult<T> {
        let value = self.entries.get(key).ok_or_else(|| CoreError::Lookup {
            scope: scope.to_string(),
            key: key.to_string(),
        })?;
        value
            .as_any()
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| CoreError::Decode {
                type_name: std::any::type_name::<T>().to_string(),
                form: value.type_name().to_string(),
                reason: format!("recording '{key}' in scope '{scope}' has another type"),
            })
    }

    /// Bulk-import recordings into an unloaded, empty store
    ///
    /// Nothing is imported if any check fails.
    ///
    /// # Errors
    ///
    /// Returns error if the store was already loaded or holds entries, or if
    /// the recordings repeat a key
    pub fn load(&mut self, scope: &str, recordings: Vec<Recording>) -> CoreResult<()> {
        if self.loaded || !self.entries.is_empty() {
            return Err(CoreError::AlreadyLoaded {
                scope: scope.to_string(),
            });
        }
        let mut entries = IndexMap::with_capacity(recordings.len());
        for Recording { key, value } in recordings {
            if entries.contains_key(&key) {
                return Err(CoreError::DuplicateKey {
                    scope: scope.to_string(),
                    key: key.to_string(),
                });
            }
            entries.insert(key, value);
        }
        self.entries = entries;
        self.loaded = true;
        Ok(())
    }

    /// Recordings in insertion order
    #[must_use]
    pub fn recordings(&self) -> Vec<Recording> {
        self.entries
            .iter()
            .map(|(key, value)| Recording::from_shared(key.clone(), Arc::clone(value)))
            .collect()
    }

    /// Source file the scope was recorded from
    #[must_use]
    pub fn origin(&self) -> Option<&Path> {
        self.origin.as_deref()
    }

    /// Set the source file the scope was recorded from
    pub fn set_origin(&mut self, origin: PathBuf) {
        self.origin = Some(origin);
    }

    /// Drop recordings, cursor, load state and origin
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
