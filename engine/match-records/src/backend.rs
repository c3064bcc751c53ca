//! Key-value blob storage and implementations

use crate::config::RecordsConfig;
use crate::error::Result;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Flat string storage keyed by name.
///
/// Reads are best-effort: a missing key is `None`, never an error.
pub trait BlobStore: Send + Sync {
    /// Fetch the blob stored under `key`
    fn load(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous blob
    fn save(&self, key: &str, value: &str) -> Result<()>;

    /// Drop the blob stored under `key`
    fn remove(&self, key: &str) -> Result<()>;
}

/// Local file-based store: one JSON object mapping keys to blobs
pub struct LocalBlobStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl LocalBlobStore {
    /// Open the store file named by the configuration, creating the data
    /// directory if needed
    pub fn open(config: &RecordsConfig) -> Result<Self> {
        config.validate().map_err(crate::error::RecordsError::config)?;
        std::fs::create_dir_all(&config.data_dir)?;
        Self::open_path(config.store_path())
    }

    /// Open a store at an explicit file path
    pub fn open_path(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Ignoring unreadable store file {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!("Opened blob store {} ({} keys)", path.display(), entries.len());
        Ok(Self { path, entries: Mutex::new(entries) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the whole file through a temp file and rename
    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl BlobStore for LocalBlobStore {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries)?;
        tracing::debug!("Saved {} ({} bytes)", key, value.len());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.lock();
        if entries.remove(key).is_some() {
            self.flush(&entries)?;
        }
        Ok(())
    }
}

/// In-memory store for testing
#[derive(Default)]
pub struct InMemoryBlobStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_local_store_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let config = RecordsConfig::new(temp_dir.path().join("nested"));

        let store = LocalBlobStore::open(&config).unwrap();
        assert_eq!(store.load("bracket"), None);

        store.save("bracket", "[]").unwrap();
        store.save("matches", "{\"next_id\":1}").unwrap();
        assert!(config.store_path().exists());
        assert!(!config.store_path().with_extension("json.tmp").exists());

        let reopened = LocalBlobStore::open(&config).unwrap();
        assert_eq!(reopened.load("bracket").as_deref(), Some("[]"));
        assert_eq!(reopened.load("matches").as_deref(), Some("{\"next_id\":1}"));
    }

    #[test]
    fn test_local_store_remove() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");

        let store = LocalBlobStore::open_path(&path).unwrap();
        store.save("a", "1").unwrap();
        store.remove("a").unwrap();
        store.remove("missing").unwrap();

        let reopened = LocalBlobStore::open_path(&path).unwrap();
        assert_eq!(reopened.load("a"), None);
    }

    #[test]
    fn test_corrupt_store_file_starts_empty() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("store.json");
        std::fs::write(&path, "not json at all").unwrap();

        let store = LocalBlobStore::open_path(&path).unwrap();
        assert_eq!(store.load("bracket"), None);

        store.save("bracket", "[]").unwrap();
        let reopened = LocalBlobStore::open_path(&path).unwrap();
        assert_eq!(reopened.load("bracket").as_deref(), Some("[]"));
    }

    #[test]
    fn test_in_memory_store() {
        let store = InMemoryBlobStore::new();
        assert!(store.is_empty());
        store.save("k", "v").unwrap();
        assert_eq!(store.load("k").as_deref(), Some("v"));
        assert_eq!(store.len(), 1);
        store.remove("k").unwrap();
        assert!(store.is_empty());
    }
}
