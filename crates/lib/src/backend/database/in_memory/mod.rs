//! In-memory backend implementation
//!
//! A `HashMap` behind a tokio `RwLock`. Suitable for tests and as the cache
//! underneath [`JsonFile`](super::JsonFile), which persists a snapshot of it
//! after every write.

mod persistence;

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::Result;
use crate::backend::Backend;

/// A simple in-memory key-value store.
#[derive(Debug, Default)]
pub struct InMemory {
    pub(crate) entries: RwLock<HashMap<String, String>>,
}

impl InMemory {
    /// Creates a new, empty `InMemory` store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `entries`.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: RwLock::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Number of keys stored.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store holds no keys.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Saves a snapshot of every key to `path` as JSON.
    ///
    /// The file is written next to `path` first and renamed into place so a
    /// crash mid-write never leaves a truncated store behind.
    pub async fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        persistence::save_to_file(self, path.as_ref()).await
    }

    /// Apply `change` to a copy of the map, write that copy to `path`, and
    /// only then make it visible.
    ///
    /// `change` returns its result and whether it modified the map; an
    /// unmodified map is neither written nor replaced. If the write fails the
    /// store is left exactly as it was.
    pub(crate) async fn commit_to_file<T, F>(&self, path: &Path, change: F) -> Result<T>
    where
        F: FnOnce(&mut HashMap<String, String>) -> (T, bool),
    {
        let mut staged = self.entries.read().await.clone();
        let (out, modified) = change(&mut staged);
        if modified {
            persistence::write_entries(&staged, path).await?;
            *self.entries.write().await = staged;
        }
        Ok(out)
    }

    /// Loads a store from a JSON file written by [`save_to_file`](Self::save_to_file).
    ///
    /// A missing file yields an empty store.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        persistence::load_from_file(path.as_ref()).await
    }
}

#[async_trait]
impl Backend for InMemory {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.entries.read().await.keys().cloned().collect())
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new: String,
    ) -> Result<bool> {
        let mut entries = self.entries.write().await;
        if entries.get(key).map(String::as_str) != expected {
            return Ok(false);
        }
        entries.insert(key.to_string(), new);
        Ok(true)
    }
}
