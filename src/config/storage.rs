//! Key-value backends for persisted configuration.
use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
    sync::Arc,
};

#[cfg(test)]
use mockall::automock;
use parking_lot::Mutex;
use tracing::trace;

use crate::error::{Error, Result};

/// Directory under the user's config dir holding persisted state
pub const CONFIG_DIR_NAME: &str = "tonic";

/// Byte-oriented persistence
#[cfg_attr(test, automock)]
pub trait KeyValueStore: Send {
    /// `Ok(None)` when nothing was ever written under `key`
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    fn write(&mut self, key: &str, value: &[u8]) -> Result<()>;
}

/// One JSON file per key inside a directory.
///
/// Writes go to a temporary file that is renamed over the target, so readers
/// never see a half-written document.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the platform config directory, e.g. `~/.config/tonic`
    pub fn default_location() -> Result<Self> {
        let base = dirs::config_dir().ok_or_else(|| Error::configuration("could not determine config directory"))?;
        Ok(Self::new(base.join(CONFIG_DIR_NAME)))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        let tmp = path.with_extension("json.tmp");

        let cleanup = scopeguard::guard(tmp.clone(), |tmp| {
            let _ = fs::remove_file(tmp);
        });
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        scopeguard::ScopeGuard::into_inner(cleanup);

        trace!(path = %path.display(), bytes = value.len(), "persisted");
        Ok(())
    }
}

/// In-memory store; clones share the same contents
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with one entry
    pub fn with_entry(key: &str, value: impl Into<Vec<u8>>) -> Self {
        let store = Self::new();
        store.entries.lock().insert(key.to_string(), value.into());
        store
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().get(key).cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.get(key))
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_vec());
        Ok(())
    }
}
