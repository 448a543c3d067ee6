//! Key-value persistence backends
//!
//! The task store only needs "read the document under a key" and "replace the
//! document under a key". Two implementations:
//!
//! - [`FileBackend`] keeps one `<key>.json` file per key in a data directory,
//!   written atomically under an advisory lock.
//! - [`MemoryBackend`] keeps documents in process memory and can be switched
//!   into a failing mode to simulate unavailable storage.
//!
//! # Directory Structure
//!
//! ```text
//! <data dir>/
//!   taskpad.toml        # Optional configuration
//!   tasks.json          # Task list under the default key
//!   tasks.json.lock     # Advisory lock for writers
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::lock::{self, DEFAULT_LOCK_TIMEOUT_MS};

/// Durable key-value storage for serialized documents
pub trait Backend {
    /// Read the document stored under `key`, or `None` if nothing is stored.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Replace the document stored under `key`.
    fn save(&self, key: &str, document: &str) -> Result<()>;
}

/// File-per-key backend rooted at a data directory
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
    lock_timeout_ms: u64,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
        }
    }

    pub fn with_lock_timeout(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    /// Path of the document stored under `key`
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Backend for FileBackend {
    /// Lock timeouts and I/O failures are returned as-is: a document that
    /// cannot be read right now is not the same as no document.
    fn load(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        lock::read_locked_str(&path, self.lock_timeout_ms)
    }

    /// Every failure comes back as [`Error::Persistence`].
    fn save(&self, key: &str, document: &str) -> Result<()> {
        let path = self.path_for(key);
        lock::write_atomic_locked(&path, document.as_bytes(), self.lock_timeout_ms)
            .map_err(|err| persistence_error(&path, err))
    }
}

fn persistence_error(path: &Path, err: Error) -> Error {
    match err {
        Error::Persistence(message) => Error::Persistence(message),
        Error::LockFailed(lock_path) => Error::Persistence(format!(
            "failed to write {}: {} is held by another process",
            path.display(),
            lock_path.display()
        )),
        other => Error::Persistence(format!("failed to write {}: {other}", path.display())),
    }
}

/// In-process backend
///
/// Clones share the same documents and failure switch, so a test can keep a
/// handle after moving one into a store.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    documents: Arc<Mutex<HashMap<String, String>>>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with `document` under `key`
    pub fn with_document(key: &str, document: impl Into<String>) -> Self {
        let backend = Self::new();
        backend.put(key, document);
        backend
    }

    /// Store a raw document, bypassing the failure switch.
    pub fn put(&self, key: &str, document: impl Into<String>) {
        if let Ok(mut documents) = self.documents.lock() {
            documents.insert(key.to_string(), document.into());
        }
    }

    /// Raw document under `key`
    pub fn get(&self, key: &str) -> Option<String> {
        self.documents
            .lock()
            .ok()
            .and_then(|documents| documents.get(key).cloned())
    }

    /// Make every subsequent `save` fail (or succeed again).
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

impl Backend for MemoryBackend {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, document: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Persistence("storage is read-only".to_string()));
        }
        let mut documents = self
            .documents
            .lock()
            .map_err(|_| Error::Persistence("storage mutex poisoned".to_string()))?;
        documents.insert(key.to_string(), document.to_string());
        Ok(())
    }
}
