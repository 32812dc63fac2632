//! Conversation persistence on top of a [`Backend`].
//!
//! Two kinds of keys are kept:
//!
//! * [`CONVERSATIONS_KEY`] holds the full list of conversations (not just
//!   their ids). This is what list views read.
//! * `conv:{id}` holds one conversation each.
//! * [`TITLE_COUNTER_KEY`] holds the last default title number, so numbers
//!   are not reused after a delete.
//!
//! Nothing ties the two together transactionally; callers that change one are
//! expected to update the other. Changes to the list that must not lose
//! concurrent updates go through [`ConversationStore::update_list`], which does
//! an optimistic compare-and-swap with bounded retries.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::backend::Backend;
use crate::clock::Clock;
use crate::constants::{
    CONVERSATION_PREFIX, CONVERSATIONS_KEY, MAX_INDEX_RETRIES, TITLE_COUNTER_KEY,
};
use crate::model::Conversation;
use crate::{Error, Result};

mod errors;
pub use errors::StoreError;

/// Handle to the conversation records of a backend. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ConversationStore {
    backend: Arc<dyn Backend>,
}

fn record_key(id: &str) -> String {
    format!("{CONVERSATION_PREFIX}{id}")
}

fn parse_list(raw: Option<&str>) -> Result<Vec<Conversation>> {
    match raw {
        None => Ok(Vec::new()),
        Some(json) => serde_json::from_str(json).map_err(|e| -> Error {
            StoreError::Corrupt {
                key: CONVERSATIONS_KEY.to_string(),
                source: e,
            }
            .into()
        }),
    }
}

fn to_json<T: serde::Serialize + ?Sized>(key: &str, value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(|e| -> Error {
        StoreError::SerializationFailed {
            key: key.to_string(),
            source: e,
        }
        .into()
    })
}

impl ConversationStore {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// The backend this store writes to.
    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    /// Write the `conv:{id}` record.
    pub async fn save(&self, conversation: &Conversation) -> Result<()> {
        let key = record_key(&conversation.id);
        let json = to_json(&key, conversation)?;
        self.backend.set(&key, json).await
    }

    /// Read the `conv:{id}` record.
    pub async fn load(&self, id: &str) -> Result<Option<Conversation>> {
        let key = record_key(id);
        match self.backend.get(&key).await? {
            None => Ok(None),
            Some(json) => serde_json::from_str(&json)
                .map(Some)
                .map_err(|e| StoreError::Corrupt { key, source: e }.into()),
        }
    }

    /// Delete the `conv:{id}` record. Returns whether it existed.
    pub async fn remove(&self, id: &str) -> Result<bool> {
        self.backend.remove(&record_key(id)).await
    }

    /// Ids of every `conv:*` record.
    pub async fn record_ids(&self) -> Result<Vec<String>> {
        Ok(self
            .backend
            .keys()
            .await?
            .into_iter()
            .filter_map(|k| k.strip_prefix(CONVERSATION_PREFIX).map(str::to_string))
            .collect())
    }

    /// The conversation list. A missing key is an empty list.
    pub async fn list(&self) -> Result<Vec<Conversation>> {
        let raw = self.backend.get(CONVERSATIONS_KEY).await?;
        parse_list(raw.as_deref())
    }

    /// Overwrite the conversation list. Last writer wins.
    pub async fn replace_list(&self, list: &[Conversation]) -> Result<()> {
        let json = to_json(CONVERSATIONS_KEY, list)?;
        self.backend.set(CONVERSATIONS_KEY, json).await
    }

    /// Read-modify-write the conversation list without losing concurrent updates.
    ///
    /// `f` may run more than once: each attempt starts from a fresh read and
    /// only commits if nobody else changed the list in between.
    pub async fn update_list<F, T>(&self, mut f: F) -> Result<T>
    where
        F: FnMut(&mut Vec<Conversation>) -> T + Send,
        T: Send,
    {
        for attempt in 1..=MAX_INDEX_RETRIES {
            let raw = self.backend.get(CONVERSATIONS_KEY).await?;
            let mut list = parse_list(raw.as_deref())?;
            let out = f(&mut list);
            let json = to_json(CONVERSATIONS_KEY, &list)?;
            if self
                .backend
                .compare_and_swap(CONVERSATIONS_KEY, raw.as_deref(), json)
                .await?
            {
                return Ok(out);
            }
            debug!(attempt, "Conversation list changed during update, retrying");
            tokio::task::yield_now().await;
        }
        warn!(
            attempts = MAX_INDEX_RETRIES,
            "Giving up on conversation list update"
        );
        Err(StoreError::IndexContention {
            attempts: MAX_INDEX_RETRIES,
        }
        .into())
    }

    /// Claim the next default title number.
    ///
    /// Numbers never go backwards: the result is one more than the larger of
    /// the last number handed out and the number of records stored now.
    pub async fn next_title_number(&self) -> Result<usize> {
        let records = self.record_ids().await?.len();
        for attempt in 1..=MAX_INDEX_RETRIES {
            let raw = self.backend.get(TITLE_COUNTER_KEY).await?;
            let last = match raw.as_deref() {
                None => 0,
                Some(raw) => serde_json::from_str::<usize>(raw).map_err(|e| -> Error {
                    StoreError::Corrupt {
                        key: TITLE_COUNTER_KEY.to_string(),
                        source: e,
                    }
                    .into()
                })?,
            };
            let next = last.max(records) + 1;
            if self
                .backend
                .compare_and_swap(TITLE_COUNTER_KEY, raw.as_deref(), next.to_string())
                .await?
            {
                return Ok(next);
            }
            debug!(attempt, "Title counter changed during update, retrying");
            tokio::task::yield_now().await;
        }
        Err(StoreError::IndexContention {
            attempts: MAX_INDEX_RETRIES,
        }
        .into())
    }

    /// Save `conversation` and append it to the list.
    pub async fn append(&self, conversation: &Conversation) -> Result<()> {
        self.save(conversation).await?;
        self.update_list(|list| list.push(conversation.clone()))
            .await
    }

    /// Remove `id` from the list and delete its record.
    ///
    /// Returns whether the list contained it.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let removed = self
            .update_list(|list| {
                let before = list.len();
                list.retain(|c| c.id != id);
                before != list.len()
            })
            .await?;
        self.remove(id).await?;
        Ok(removed)
    }

    /// Mint an id, build a conversation with it, and append it.
    ///
    /// Ids are the creation time in milliseconds. When that id is already in
    /// use (two creations in the same millisecond) a `-N` suffix is added. The
    /// check runs inside the list update, so concurrent creators cannot both
    /// claim the same id.
    pub async fn create<F>(&self, clock: &dyn Clock, build: F) -> Result<Conversation>
    where
        F: Fn(String) -> Conversation + Send + Sync,
    {
        let base = clock.now_millis().to_string();
        let records: HashSet<String> = self.record_ids().await?.into_iter().collect();

        let conversation = self
            .update_list(|list| {
                let taken = |candidate: &str| {
                    records.contains(candidate) || list.iter().any(|c| c.id == candidate)
                };
                let mut id = base.clone();
                let mut n = 0;
                while taken(&id) {
                    n += 1;
                    id = format!("{base}-{n}");
                }
                let conversation = build(id);
                list.push(conversation.clone());
                conversation
            })
            .await?;

        self.save(&conversation).await?;
        debug!(id = %conversation.id, "Created conversation");
        Ok(conversation)
    }
}
