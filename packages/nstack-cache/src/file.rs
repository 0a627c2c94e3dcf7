use crate::{KeyValueStore, StoreError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// Store backed by a single JSON object on disk.
///
/// The file is read on first access and rewritten on every mutation. A
/// missing file is an empty store.
pub struct FileStore {
    path: PathBuf,
    data: Mutex<Option<BTreeMap<String, String>>>,
}

impl FileStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            data: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(content) => {
                tracing::debug!(path = %self.path.display(), "loading store");
                serde_json::from_slice(&content).map_err(|source| StoreError::Serde {
                    key: self.path.display().to_string(),
                    source,
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, data: &BTreeMap<String, String>) -> Result<(), StoreError> {
        let parent = self.path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "store path has no parent")
        })?;
        tokio::fs::create_dir_all(parent).await?;
        let json = serde_json::to_vec_pretty(data).map_err(|source| StoreError::Serde {
            key: self.path.display().to_string(),
            source,
        })?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }

    async fn with_data<R>(
        &self,
        mutate: bool,
        f: impl FnOnce(&mut BTreeMap<String, String>) -> R,
    ) -> Result<R, StoreError> {
        let mut guard = self.data.lock().await;
        if guard.is_none() {
            *guard = Some(self.load().await?);
        }
        let data = guard.get_or_insert_with(BTreeMap::new);
        if !mutate {
            return Ok(f(data));
        }
        // Only a map that reached the disk replaces the cached one.
        let mut next = data.clone();
        let result = f(&mut next);
        self.save(&next).await?;
        *data = next;
        Ok(result)
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.with_data(false, |data| data.get(key).cloned()).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.with_data(true, |data| {
            data.insert(key.to_string(), value.to_string());
        })
        .await
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.with_data(true, |data| {
            data.remove(key);
        })
        .await
    }

    async fn clear(&self) -> Result<(), StoreError> {
        self.with_data(true, |data| data.clear()).await
    }
}
