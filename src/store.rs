//! Local persistence: a small injected key-value interface.
//!
//! The credential and the analysis history are the only durable state in
//! paperlens, and both are single string blobs. Modelling persistence as a
//! trait rather than ambient global storage means the gateway and the
//! history store receive their backing store explicitly — production code
//! injects [`FileStore`], tests inject [`MemoryStore`] and never touch disk.

use crate::error::LensError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// String-keyed blob storage. Implementations must be cheap to clone behind
/// an `Arc` and safe to call from async contexts (all operations are small
/// synchronous reads/writes).
pub trait KeyValueStore: Send + Sync {
    /// Read the value for `key`, or `None` if unset.
    fn get(&self, key: &str) -> Result<Option<String>, LensError>;

    /// Set `key` to `value`, overwriting any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), LensError>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<(), LensError>;
}

// ── File-backed store ────────────────────────────────────────────────────

/// One file per key under a data directory.
///
/// Writes are atomic (temp file + rename) so a crash mid-write never leaves
/// a half-serialised history blob behind.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl AsRef<Path>) -> Result<Self, LensError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)
            .map_err(|e| LensError::Store(format!("create {}: {e}", dir.display())))?;
        Ok(Self { dir })
    }

    /// Open the default per-user store (`<data dir>/paperlens`).
    pub fn open_default() -> Result<Self, LensError> {
        let base = dirs::data_dir()
            .ok_or_else(|| LensError::Store("no data directory on this platform".into()))?;
        Self::open(base.join("paperlens"))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        // Keys are internal identifiers ("api_key", "history"), not user
        // input, but keep them filesystem-safe anyway.
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{safe}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, LensError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(LensError::Store(format!("read {}: {e}", path.display()))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LensError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)
            .map_err(|e| LensError::Store(format!("write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, &path)
            .map_err(|e| LensError::Store(format!("rename {}: {e}", path.display())))?;
        debug!("stored {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), LensError> {
        let path = self.path_for(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(LensError::Store(format!("remove {}: {e}", path.display()))),
        }
    }
}

// ── In-memory store ──────────────────────────────────────────────────────

/// In-memory store for tests and embedding without a filesystem.
#[derive(Default)]
pub struct MemoryStore {
    map: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, LensError> {
        Ok(self.map.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), LensError> {
        self.map
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), LensError> {
        self.map.lock().unwrap().remove(key);
        Ok(())
    }
}
