//! Lock helpers.

use std::sync::{Mutex, MutexGuard};
use tracing::warn;

// Writers only replace whole entries, so a poisoned lock holds consistent data.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!("recovered poisoned mutex");
        poisoned.into_inner()
    })
}
