//! Scoped record/replay.
//!
//! A [`Recorder`] holds one store per scope. While recording is enabled,
//! `record` stores the live value under (scope, key) and hands it back;
//! while disabled it returns what was stored instead. Each scope has its
//! own lock, so tests recording into different scopes never contend.

use crate::recordable::{Recordable, Recording};
use crate::source::{Load, RecordingSource};
use crate::store::ScopeStore;
use crate::sync::{lock, read, write};
use encore_core::{CoreResult, Key};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tracing::debug;

/// Scoped recorder
#[derive(Debug, Default)]
pub struct Recorder {
    scopes: RwLock<HashMap<String, Arc<Mutex<ScopeStore>>>>,
    enabled: AtomicBool,
}

impl Recorder {
    /// Create a recorder in replay mode
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch between recording (`true`) and replay (`false`)
    pub fn enable_recording(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Check whether recording is enabled
    #[must_use]
    pub fn recording_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn store(&self, scope: &str) -> Arc<Mutex<ScopeStore>> {
        if let Some(store) = read(&self.scopes).get(scope) {
            return Arc::clone(store);
        }
        Arc::clone(write(&self.scopes).entry(scope.to_string()).or_default())
    }

    fn existing(&self, scope: &str) -> Option<Arc<Mutex<ScopeStore>>> {
        read(&self.scopes).get(scope).map(Arc::clone)
    }

    /// Record or replay the value under `key`
    ///
    /// # Errors
    ///
    /// Returns error if the key was already recorded (recording) or is
    /// missing or of another type (replay)
    pub fn record<T>(&self, scope: &str, key: impl Into<Key>, live: T) -> CoreResult<T>
    where
        T: Recordable + Clone,
    {
        let store = self.store(scope);
        let mut store = lock(&store);
        self.resolve(&mut store, scope, key.into(), || live)
    }

    /// Like [`record`](Self::record), computing the live value only while
    /// recording
    ///
    /// # Errors
    ///
    /// Same as [`record`](Self::record)
    pub fn record_with<T, F>(&self, scope: &str, key: impl Into<Key>, live: F) -> CoreResult<T>
    where
        T: Recordable + Clone,
        F: FnOnce() -> T,
    {
        let store = self.store(scope);
        let mut store = lock(&store);
        self.resolve(&mut store, scope, key.into(), live)
    }

    /// Record or replay under the scope's next sequential key
    ///
    /// # Errors
    ///
    /// Same as [`record`](Self::record)
    pub fn record_next<T>(&self, scope: &str, live: T) -> CoreResult<T>
    where
        T: Recordable + Clone,
    {
        let store = self.store(scope);
        let mut store = lock(&store);
        let key = store.next_key();
        self.resolve(&mut store, scope, key, || live)
    }

    fn resolve<T, F>(&self, store: &mut ScopeStore, scope: &str, key: Key, live: F) -> CoreResult<T>
    where
        T: Recordable + Clone,
        F: FnOnce() -> T,
    {
        if self.recording_enabled() {
            let live = live();
            store.insert(scope, key.clone(), Arc::new(live.clone()))?;
            debug!(scope, %key, "recorded");
            Ok(live)
        } else {
            let stored = store.replay(scope, &key)?;
            debug!(scope, %key, "replayed");
            Ok(stored)
        }
    }

    /// Bulk-import recordings for a scope
    ///
    /// # Errors
    ///
    /// Returns error if the scope was already loaded or holds entries, or if
    /// the recordings repeat a key
    pub fn load(&self, scope: &str, recordings: Vec<Recording>) -> CoreResult<()> {
        let count = recordings.len();
        let store = self.store(scope);
        lock(&store).load(scope, recordings)?;
        debug!(scope, count, "loaded recordings");
        Ok(())
    }

    /// Drop every scope, cursor and origin
    pub fn reset(&self) {
        write(&self.scopes).clear();
        debug!("recorder reset");
    }

    /// Recordings of a scope in insertion order
    #[must_use]
    pub fn recordings(&self, scope: &str) -> Vec<Recording> {
        self.existing(scope)
            .map(|store| lock(&store).recordings())
            .unwrap_or_default()
    }

    /// Names of non-empty scopes, sorted
    #[must_use]
    pub fn scopes(&self) -> Vec<String> {
        self.snapshot().into_keys().collect()
    }

    /// Non-empty scopes and their recordings, ordered by scope name
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<String, Vec<Recording>> {
        let stores: Vec<(String, Arc<Mutex<ScopeStore>>)> = read(&self.scopes)
            .iter()
            .map(|(name, store)| (name.clone(), Arc::clone(store)))
            .collect();
        stores
            .into_iter()
            .filter_map(|(name, store)| {
                let recordings = lock(&store).recordings();
                (!recordings.is_empty()).then_some((name, recordings))
            })
            .collect()
    }

    /// Remember the source file a scope is recorded from
    pub fn set_origin(&self, scope: &str, origin: impl Into<PathBuf>) {
        let store = self.store(scope);
        lock(&store).set_origin(origin.into());
    }

    /// Source file a scope was recorded from
    #[must_use]
    pub fn origin(&self, scope: &str) -> Option<PathBuf> {
        self.existing(scope)
            .and_then(|store| lock(&store).origin().map(PathBuf::from))
    }
}

impl Load for Recorder {
    fn load(&self, name: &str, recordings: Vec<Recording>) -> CoreResult<()> {
        Recorder::load(self, name, recordings)
    }
}

impl RecordingSource for Recorder {
    fn snapshot(&self) -> BTreeMap<String, Vec<Recording>> {
        Recorder::snapshot(self)
    }

    fn origin(&self, scope: &str) -> Option<PathBuf> {
        Recorder::origin(self, scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encore_core::CoreError;
    use proptest::prelude::*;
    use serde::Serialize;

    #[derive(Debug, Clone, PartialEq, Default, Serialize)]
    struct Dog {
        name: String,
        breed: String,
    }

    fn dog(name: &str, breed: &str) -> Dog {
        Dog {
            name: name.to_string(),
            breed: breed.to_string(),
        }
    }

    fn recording() -> Recorder {
        let recorder = Recorder::new();
        recorder.enable_recording(true);
        recorder
    }

    #[test]
    fn test_record_returns_live_value() {
        let recorder = recording();
        let live = dog("Lido", "Terrier");
        assert_eq!(recorder.record("kv", "dog1", live.clone()).unwrap(), live);
        assert_eq!(recorder.recordings("kv").len(), 1);
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let recorder = recording();
        recorder.record("kv", "dog1", dog("Lido", "Terrier")).unwrap();
        let err = recorder.record("kv", "dog1", dog("Rex", "Boxer")).unwrap_err();
        assert!(matches!(err, CoreError::DuplicateKey { .. }));
    }

    #[test]
    fn test_replay_returns_stored_value() {
        let recorder = Recorder::new();
        recorder
            .load(
                "kv",
                vec![
                    Recording::new("dog1", dog("Lido", "Terrier")),
                    Recording::new("dog2", dog("Rex", "Boxer")),
                ],
            )
            .unwrap();

        let replayed = recorder.record("kv", "dog1", Dog::default()).unwrap();
        assert_eq!(replayed, dog("Lido", "Terrier"));

        let err = recorder.record("kv", "dog3", Dog::default()).unwrap_err();
        assert_eq!(
            err,
            CoreError::Lookup {
                scope: "kv".to_string(),
                key: "dog3".to_string(),
            }
        );
    }

    #[test]
    fn test_replay_skips_live_closure() {
        let recorder = Recorder::new();
        recorder.load("kv", vec![Recording::new("n", 3u32)]).unwrap();
        let value = recorder
            .record_with("kv", "n", || -> u32 { panic!("computed during replay") })
            .unwrap();
        assert_eq!(value, 3);
    }

    #[test]
    fn test_sequential_keys() {
        let recorder = recording();
        for n in ["a", "b", "c"] {
            recorder.record_next("seq", n.to_string()).unwrap();
        }
        let keys: Vec<Key> = recorder.recordings("seq").into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec![Key::Index(0), Key::Index(1), Key::Index(2)]);

        let replay = Recorder::new();
        replay.load("seq", recorder.recordings("seq")).unwrap();
        let values: Vec<String> = (0..3)
            .map(|_| replay.record_next("seq", String::new()).unwrap())
            .collect();
        assert_eq!(values, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_load_twice_rejected() {
        let recorder = Recorder::new();
        recorder.load("kv", vec![]).unwrap();
        let err = recorder.load("kv", vec![]).unwrap_err();
        assert!(matches!(err, CoreError::AlreadyLoaded { .. }));

        let recorder = recording();
        recorder.record("kv", "dog1", 1u8).unwrap();
        assert!(recorder.load("kv", vec![]).is_err());
    }

    #[test]
    fn test_reset_and_snapshot() {
        let recorder = recording();
        recorder.record("b", "k", 1u8).unwrap();
        recorder.record("a", "k", 2u8).unwrap();
        recorder.set_origin("a", "tests/a.rs");
        recorder.set_origin("empty", "tests/empty.rs");
        assert_eq!(recorder.scopes(), vec!["a", "b"]);
        assert_eq!(recorder.origin("a"), Some(PathBuf::from("tests/a.rs")));

        recorder.reset();
        assert!(recorder.snapshot().is_empty());
        assert!(recorder.origin("a").is_none());
        assert_eq!(recorder.record_next("a", 0u8).unwrap(), 0);
        assert_eq!(recorder.recordings("a")[0].key, Key::Index(0));
    }

    #[test]
    fn test_parallel_recording() {
        let recorder = recording();
        std::thread::scope(|s| {
            for t in 0..8 {
                let recorder = &recorder;
                s.spawn(move || {
                    for i in 0..50u64 {
                        recorder.record_next("shared", i).unwrap();
                        recorder.record(&format!("own{t}"), i, i).unwrap();
                    }
                });
            }
        });
        assert_eq!(recorder.recordings("shared").len(), 400);
        let snapshot = recorder.snapshot();
        assert_eq!(snapshot.len(), 9);
        assert!(snapshot
            .iter()
            .filter(|(name, _)| name.starts_with("own"))
            .all(|(_, recs)| recs.len() == 50));
    }

    proptest::proptest! {
        #[test]
        fn prop_cursor_is_monotonic(count in 0usize..40) {
            let recorder = recording();
            for i in 0..count {
                recorder.record_next("p", i as u64).unwrap();
            }
            let keys: Vec<Key> = recorder.recordings("p").into_iter().map(|r| r.key).collect();
            let expected: Vec<Key> = (0..count as u64).map(Key::Index).collect();
            prop_assert_eq!(keys, expected);
        }
    }
}
