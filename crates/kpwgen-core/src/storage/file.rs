//! JSON file storage backend
//!
//! Stores every entry in a single `store.json` in the user's data directory.
//! Values are non-secret settings, so they are kept as plain text.

use async_trait::async_trait;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::KeyValueStore;
use crate::error::{KpwgenError, Result};

const STORE_FILE: &str = "store.json";
const QUARANTINE_FILE: &str = "store.json.corrupt";

/// File format for persistent storage
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    entries: HashMap<String, String>,
}

/// JSON file storage backend
pub struct FileStore {
    /// Directory holding the store file
    storage_dir: PathBuf,
    /// In-memory copy of the file contents
    cache: RwLock<HashMap<String, String>>,
}

impl FileStore {
    /// Open the store in the default data directory
    pub async fn open_default() -> Result<Self> {
        Self::open(Self::default_dir()?).await
    }

    /// Open the store in `storage_dir`, loading any existing contents
    pub async fn open(storage_dir: PathBuf) -> Result<Self> {
        tokio::fs::create_dir_all(&storage_dir).await?;

        let store = Self {
            storage_dir,
            cache: RwLock::new(HashMap::new()),
        };
        store.load().await?;

        debug!("File store opened at: {:?}", store.storage_dir);
        Ok(store)
    }

    /// Get the default storage directory
    pub fn default_dir() -> Result<PathBuf> {
        ProjectDirs::from("com", "kpwgen", "kpwgen")
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                KpwgenError::StorageError("Could not determine data directory".to_string())
            })
    }

    /// Get the storage directory path
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    fn store_file_path(&self) -> PathBuf {
        self.storage_dir.join(STORE_FILE)
    }

    async fn load(&self) -> Result<()> {
        let path = self.store_file_path();

        if !path.exists() {
            debug!("No existing store file found");
            return Ok(());
        }

        let contents = tokio::fs::read_to_string(&path).await?;
        let file: StoreFile = match serde_json::from_str(&contents) {
            Ok(file) => file,
            Err(e) => {
                // Move the bad file aside and start empty
                let quarantine = self.storage_dir.join(QUARANTINE_FILE);
                warn!(
                    "Unreadable store file {:?} ({}), moved to {:?}",
                    path, e, quarantine
                );
                tokio::fs::rename(&path, &quarantine).await?;
                return Ok(());
            }
        };

        let mut cache = self.cache.write().await;
        *cache = file.entries;

        debug!("Loaded {} entries from store", cache.len());
        Ok(())
    }

    async fn save(&self, entries: &HashMap<String, String>) -> Result<()> {
        let file = StoreFile {
            version: 1,
            entries: entries.clone(),
        };

        let contents = serde_json::to_string_pretty(&file)?;
        let path = self.store_file_path();

        // Write atomically using a temp file
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &path).await?;

        debug!("Saved {} entries to store", entries.len());
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let cache = self.cache.read().await;
        Ok(cache.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        // Holding the write guard keeps concurrent writers ordered on disk
        let mut cache = self.cache.write().await;

        // The cache only changes once the new contents are on disk
        let mut updated = cache.clone();
        updated.insert(key.to_string(), value.to_string());
        self.save(&updated).await?;
        *cache = updated;

        debug!("Stored key: {}", key);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut cache = self.cache.write().await;

        if cache.contains_key(key) {
            let mut updated = cache.clone();
            updated.remove(key);
            self.save(&updated).await?;
            *cache = updated;
            debug!("Deleted key: {}", key);
        }

        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "JSON File Storage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_set_and_get() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path().to_path_buf()).await.unwrap();

        store.set("test-key", "test-value").await.unwrap();

        let value = store.get("test-key").await.unwrap();
        assert_eq!(value, Some("test-value".to_string()));
    }

    #[tokio::test]
    async fn test_get_nonexistent() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path().to_path_buf()).await.unwrap();

        assert_eq!(store.get("nonexistent").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileStore::open(temp_dir.path().to_path_buf()).await.unwrap();

        store.set("test-key", "test-value").await.unwrap();
        store.delete("test-key").await.unwrap();
        store.delete("test-key").await.unwrap();

        assert_eq!(store.get("test-key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_persistence() {
        let temp_dir = TempDir::new().unwrap();

        {
            let store = FileStore::open(temp_dir.path().to_path_buf()).await.unwrap();
            store.set("persistent-key", "persistent-value").await.unwrap();
        }

        {
            let store = FileStore::open(temp_dir.path().to_path_buf()).await.unwrap();
            let value = store.get("persistent-key").await.unwrap();
            assert_eq!(value, Some("persistent-value".to_string()));
        }
    }

    #[tokio::test]
    async fn test_truncated_file_is_quarantined() {
        let temp_dir = TempDir::new().unwrap();
        let truncated = r#"{"version":1,"entr"#;
        std::fs::write(temp_dir.path().join(STORE_FILE), truncated).unwrap();

        let store = FileStore::open(temp_dir.path().to_path_buf()).await.unwrap();
        assert_eq!(store.get("any").await.unwrap(), None);
        assert!(!temp_dir.path().join(STORE_FILE).exists());
        assert_eq!(
            std::fs::read_to_string(temp_dir.path().join(QUARANTINE_FILE)).unwrap(),
            truncated
        );

        // The store is usable again and survives a reopen
        store.set("key", "value").await.unwrap();
        let reopened = FileStore::open(temp_dir.path().to_path_buf()).await.unwrap();
        assert_eq!(reopened.get("key").await.unwrap(), Some("value".to_string()));
    }

    #[tokio::test]
    async fn test_failed_write_leaves_cache_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let storage_dir = temp_dir.path().join("store");
        let store = FileStore::open(storage_dir.clone()).await.unwrap();
        store.set("kept", "old").await.unwrap();

        std::fs::remove_dir_all(&storage_dir).unwrap();

        assert!(store.set("kept", "new").await.is_err());
        assert!(store.set("fresh", "value").await.is_err());
        assert!(store.delete("kept").await.is_err());

        assert_eq!(store.get("kept").await.unwrap(), Some("old".to_string()));
        assert_eq!(store.get("fresh").await.unwrap(), None);
    }
}
