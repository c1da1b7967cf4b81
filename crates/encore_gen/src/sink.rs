//! Artifact sinks.

use crate::sync::lock;
use encore_core::{CoreError, CoreResult};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;

/// Durable destination for rendered artifacts
pub trait Sink: Send + Sync {
    /// Write `contents` to `path`, replacing any previous artifact
    ///
    /// # Errors
    ///
    /// Returns error if the artifact cannot be written
    fn write(&self, path: &Path, contents: &str) -> CoreResult<()>;
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn write(&self, path: &Path, contents: &str) -> CoreResult<()> {
        (**self).write(path, contents)
    }
}

/// Writes artifacts to disk through a staging file
///
/// The staging file lives next to the target and is renamed over it, so
/// readers see either the old artifact or the new one.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSink;

impl Sink for FileSink {
    fn write(&self, path: &Path, contents: &str) -> CoreResult<()> {
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|err| CoreError::io(dir, &err))?;
        let mut staged = NamedTempFile::new_in(dir).map_err(|err| CoreError::io(dir, &err))?;
        staged
            .write_all(contents.as_bytes())
            .and_then(|()| staged.as_file().sync_all())
            .map_err(|err| CoreError::io(staged.path(), &err))?;
        staged
            .persist(path)
            .map_err(|err| CoreError::io(path, &err.error))?;
        Ok(())
    }
}

/// Keeps artifacts in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Mutex<BTreeMap<PathBuf, String>>,
}

impl MemorySink {
    /// Create an empty sink
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents written to `path`
    #[must_use]
    pub fn get(&self, path: impl AsRef<Path>) -> Option<String> {
        lock(&self.files).get(path.as_ref()).cloned()
    }

    /// Every written artifact by path
    #[must_use]
    pub fn files(&self) -> BTreeMap<PathBuf, String> {
        lock(&self.files).clone()
    }
}

impl Sink for MemorySink {
    fn write(&self, path: &Path, contents: &str) -> CoreResult<()> {
        lock(&self.files).insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}
