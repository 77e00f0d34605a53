//! String key-value stores backing [`super::BlobStore`].

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use async_trait::async_trait;
use tempfile::NamedTempFile;

use crate::{Error, Result};

/// Minimal async key-value interface: whole string values per key.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>>;

    async fn set_item(&self, key: &str, value: &str) -> Result<()>;

    async fn remove_item(&self, key: &str) -> Result<()>;

    /// Where the value for `key` lives, for diagnostics.
    fn location(&self, key: &str) -> String;
}

/// One file per key under a directory: `<dir>/<key>.json`.
///
/// Writes go to a fresh temporary file in the same directory that is then
/// renamed over the target, so a crash mid-write never leaves a truncated
/// value behind.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(Error::Storage(format!("Invalid storage key: {:?}", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::Storage(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        let dir = self.dir.clone();
        let value = value.to_owned();

        // Each write gets its own temp file, so overlapping writers never
        // rename each other's data; the last rename wins.
        tokio::task::spawn_blocking(move || -> Result<()> {
            std::fs::create_dir_all(&dir)?;
            let mut tmp = NamedTempFile::new_in(&dir)?;
            tmp.write_all(value.as_bytes())?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| {
                Error::Storage(format!("Failed to write {}: {}", path.display(), e.error))
            })?;
            Ok(())
        })
        .await
        .map_err(|e| Error::Internal(format!("Storage write task failed: {}", e)))?
    }

    fn location(&self, key: &str) -> String {
        self.dir.join(format!("{}.json", key)).display().to_string()
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store, used in tests and for ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self
            .items
            .read()
            .map_err(|_| Error::Storage("key-value store lock poisoned".to_string()))?;
        Ok(items.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self
            .items
            .write()
            .map_err(|_| Error::Storage("key-value store lock poisoned".to_string()))?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self
            .items
            .write()
            .map_err(|_| Error::Storage("key-value store lock poisoned".to_string()))?;
        items.remove(key);
        Ok(())
    }

    fn location(&self, key: &str) -> String {
        format!("memory://{}", key)
    }
}
