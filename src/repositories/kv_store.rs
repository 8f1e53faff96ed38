use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

use crate::models::RepositoryResult;

/// File name of the file-backed store inside the data directory
pub const STORE_FILE_NAME: &str = "store.json";

/// String key-value collection shared with the storefront widgets
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Backend name used as a metrics label
    fn backend(&self) -> &'static str;

    async fn get(&self, key: &str) -> RepositoryResult<Option<String>>;

    async fn set(&self, key: &str, value: String) -> RepositoryResult<()>;

    /// Remove a key. Returns whether it was present.
    async fn remove(&self, key: &str) -> RepositoryResult<bool>;
}

#[derive(Default)]
struct StoreContents {
    entries: BTreeMap<String, String>,
    /// The file exists but does not hold a JSON object of strings
    unreadable: bool,
}

/// Store kept as a single JSON object on disk.
///
/// Writes go through a temporary file followed by a rename so a crash never
/// leaves a half-written object behind.
pub struct FileKeyValueStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileKeyValueStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let path = data_dir.as_ref().join(STORE_FILE_NAME);
        info!(path = %path.display(), "Using file-backed key-value store");
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> RepositoryResult<StoreContents> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(StoreContents::default()),
            Err(e) => return Err(e.into()),
        };

        if raw.trim().is_empty() {
            return Ok(StoreContents::default());
        }

        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(StoreContents {
                entries,
                unreadable: false,
            }),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Store file is unreadable, treating it as empty"
                );
                Ok(StoreContents {
                    entries: BTreeMap::new(),
                    unreadable: true,
                })
            }
        }
    }

    async fn persist(&self, entries: &BTreeMap<String, String>) -> RepositoryResult<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(entries)?;
        let tmp_path = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp_path, json).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        debug!(entries = entries.len(), "Key-value store persisted");
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    fn backend(&self) -> &'static str {
        "file"
    }

    async fn get(&self, key: &str) -> RepositoryResult<Option<String>> {
        let contents = self.load().await?;
        Ok(contents.entries.get(key).cloned())
    }

    #[instrument(skip(self, value))]
    async fn set(&self, key: &str, value: String) -> RepositoryResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut entries = self.load().await?.entries;
        entries.insert(key.to_string(), value);
        self.persist(&entries).await
    }

    #[instrument(skip(self))]
    async fn remove(&self, key: &str) -> RepositoryResult<bool> {
        let _guard = self.write_lock.lock().await;
        let StoreContents {
            mut entries,
            unreadable,
        } = self.load().await?;
        let removed = entries.remove(key).is_some();
        // An unreadable file is replaced so later reads see a valid object
        if removed || unreadable {
            self.persist(&entries).await?;
        }
        Ok(removed)
    }
}

/// Store held in process memory, used for tests and ephemeral deployments
#[derive(Default)]
pub struct InMemoryKeyValueStore {
    entries: RwLock<HashMap<String, String>>,
}

impl InMemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for InMemoryKeyValueStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> RepositoryResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> RepositoryResult<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> RepositoryResult<bool> {
        Ok(self.entries.write().await.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RepositoryError;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_file_store_missing_file_reads_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        assert!(store.get("anything").await.unwrap().is_none());
        assert!(!store.remove("anything").await.unwrap());
    }

    #[tokio::test]
    async fn test_file_store_round_trip_and_remove() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        store.set("a", "1".to_string()).await.unwrap();
        store.set("b", "2".to_string()).await.unwrap();

        let reopened = FileKeyValueStore::new(temp_dir.path());
        assert_eq!(reopened.get("a").await.unwrap().as_deref(), Some("1"));

        assert!(reopened.remove("a").await.unwrap());
        assert!(reopened.get("a").await.unwrap().is_none());
        assert_eq!(reopened.get("b").await.unwrap().as_deref(), Some("2"));

        let raw = std::fs::read_to_string(reopened.path()).unwrap();
        assert!(!raw.contains("\"a\""));
    }

    #[tokio::test]
    async fn test_file_store_creates_data_dir() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("nested").join("data");
        let store = FileKeyValueStore::new(&nested);

        store.set("k", "v".to_string()).await.unwrap();
        assert!(nested.join(STORE_FILE_NAME).exists());
    }

    #[tokio::test]
    async fn test_file_store_corrupt_object_reads_empty_and_remove_repairs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(STORE_FILE_NAME);
        std::fs::write(&path, "{garbage").unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        assert!(store.get("k").await.unwrap().is_none());
        assert!(!store.remove("k").await.unwrap());

        let raw = std::fs::read_to_string(&path).unwrap();
        let repaired: BTreeMap<String, String> = serde_json::from_str(&raw).unwrap();
        assert!(repaired.is_empty());
    }

    #[tokio::test]
    async fn test_file_store_unreadable_path_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the store file should be cannot be read as text
        std::fs::create_dir(temp_dir.path().join(STORE_FILE_NAME)).unwrap();
        let store = FileKeyValueStore::new(temp_dir.path());

        match store.get("k").await {
            Err(RepositoryError::Io { .. }) => {}
            other => panic!("Expected Io error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = InMemoryKeyValueStore::new();
        assert_eq!(store.backend(), "memory");

        store.set("k", "v".to_string()).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        assert!(store.remove("k").await.unwrap());
        assert!(!store.remove("k").await.unwrap());
    }
}
