//! Error types for the conversation store.

use thiserror::Error;

/// Errors raised while reading or writing conversation records.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// A stored value could not be parsed as the expected JSON shape.
    #[error("Corrupt value under '{key}'")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be serialized.
    #[error("Serialization failed for '{key}'")]
    SerializationFailed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The conversation list kept changing underneath an update.
    #[error("Conversation list update lost the race {attempts} times in a row")]
    IndexContention { attempts: usize },
}

impl StoreError {
    /// Check if this error is related to serialization
    pub fn is_serialization_error(&self) -> bool {
        matches!(
            self,
            StoreError::Corrupt { .. } | StoreError::SerializationFailed { .. }
        )
    }

    /// Check if this error is an optimistic-update conflict
    pub fn is_concurrency_error(&self) -> bool {
        matches!(self, StoreError::IndexContention { .. })
    }

    /// Get the key if this is a key-related error
    pub fn key(&self) -> Option<&str> {
        match self {
            StoreError::Corrupt { key, .. } | StoreError::SerializationFailed { key, .. } => {
                Some(key)
            }
            StoreError::IndexContention { .. } => None,
        }
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
