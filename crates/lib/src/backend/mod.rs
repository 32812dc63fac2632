//! Key-value backends for Spamscope state
//!
//! All persistent state lives in a string key-value store. The store is an
//! explicit [`Backend`] handed to whoever needs persistence, so tests can
//! substitute the in-memory implementation for the file-backed one.
//!
//! Values are opaque strings; the conversation layer stores JSON in them.

use async_trait::async_trait;

use crate::Result;

pub mod database;
pub mod errors;

pub use database::{InMemory, JsonFile};
pub use errors::BackendError;

/// Key-value storage used for conversations.
///
/// Plain `set` is last-writer-wins. Callers that need to read, modify and
/// write a value without losing concurrent updates use
/// [`compare_and_swap`](Backend::compare_and_swap) in a retry loop.
#[async_trait]
pub trait Backend: Send + Sync + std::fmt::Debug {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Delete `key`. Returns whether a value was present.
    async fn remove(&self, key: &str) -> Result<bool>;

    /// All keys currently stored, in no particular order.
    async fn keys(&self) -> Result<Vec<String>>;

    /// Atomically replace the value under `key` if it still equals `expected`.
    ///
    /// `expected == None` means the key must be absent. Returns `false`
    /// without writing when the current value differs.
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&str>,
        new: String,
    ) -> Result<bool>;
}
