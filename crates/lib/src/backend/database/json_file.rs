//! File-backed store with write-through persistence.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::InMemory;
use crate::Result;
use crate::backend::Backend;

/// An [`InMemory`] store mirrored to a JSON file after every write.
///
/// Reads are served from memory. Each mutation rewrites the whole file,
/// serialized through an internal lock so snapshots land on disk in the order
/// the writes happened. A mutation becomes visible in memory only after its
/// snapshot reached the disk, so a failed write changes nothing.
#[derive(Debug)]
pub struct JsonFile {
    path: PathBuf,
    inner: InMemory,
    write_lock: Mutex<()>,
}

impl JsonFile {
    /// Open the store at `path`, creating parent directories as needed.
    ///
    /// A missing file starts an empty store; nothing is written until the
    /// first mutation.
    pub async fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                crate::backend::BackendError::FileIo {
                    path: parent.to_path_buf(),
                    source: e,
                }
            })?;
        }
        let inner = InMemory::load_from_file(&path).await?;
        info!(path = %path.display(), keys = inner.len().await, "Opened store file");
        Ok(Self {
            path,
            inner,
            write_lock: Mutex::new(()),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl Backend for JsonFile {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        debug!(path = %self.path.display(), key, "Persisting store");
        self.inner
            .commit_to_file(&self.path, |entries| {
                entries.insert(key.to_string(), value);
                ((), true)
            })
            .await
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        self.inner
            .commit_to_file(&self.path, |entries| {
                let existed = entries.remove(key).is_some();
                (existed, existed)
            })
            .await
    }

    async fn keys(&self) -> Result<Vec<String>> {
        self.inner.keys().await
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new: String,
    ) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        self.inner
            .commit_to_file(&self.path, |entries| {
                if entries.get(key).map(String::as_str) != expected {
                    return (false, false);
                }
                entries.insert(key.to_string(), new);
                (true, true)
            })
            .await
    }
}
