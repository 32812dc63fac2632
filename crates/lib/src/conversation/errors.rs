//! Error types for conversation sessions.

use thiserror::Error;

/// Errors raised by [`ConversationSession`](super::ConversationSession).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConversationError {
    /// No conversation with this id is in the list.
    #[error("Conversation not found: {id}")]
    NotFound { id: String },
}

impl ConversationError {
    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConversationError::NotFound { .. })
    }
}

impl From<ConversationError> for crate::Error {
    fn from(err: ConversationError) -> Self {
        crate::Error::Conversation(err)
    }
}
