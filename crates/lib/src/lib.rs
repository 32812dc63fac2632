//!
//! Spamscope: review suspected spam emails and keep track of scam conversations.
//!
//! The library holds the state the review tool works with. Classification and
//! reply drafting are delegated to an external HTTP service; everything else
//! lives in a local key-value store.
//!
//! ## Core Concepts
//!
//! * **Backends (`backend::Backend`)**: Pluggable string key-value storage with an atomic compare-and-swap. `InMemory` for tests, `JsonFile` for a single write-through file.
//! * **Conversation store (`store::ConversationStore`)**: The ordered conversation list plus one record per conversation, updated optimistically so concurrent writers never lose each other's changes.
//! * **Conversation session (`conversation::ConversationSession`)**: Selection, renaming, drafts and reply generation for a single user working through the list.
//! * **Classifier (`classifier::ClassifierApi`)**: The remote spam classifier and reply generator. `HttpClassifier` talks to the real service.
//! * **Batch import (`batch::BatchSession`)**: Many files classified in bounded groups, sortable, with spam rows promotable into conversations.
//! * **Connectivity (`connectivity::ConnectivityMonitor`)**: A periodic ping publishing whether the classifier is reachable.

pub mod backend;
pub mod batch;
pub mod check;
pub mod classifier;
pub mod clock;
pub mod config;
pub mod connectivity;
pub mod constants;
pub mod conversation;
pub mod model;
pub mod store;

/// Test doubles, available to downstream crates with the `testing` feature.
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use batch::{BatchOptions, BatchReport, BatchSession, FileRow, RowStatus};
pub use check::SpamCheck;
pub use classifier::{Classification, ClassifierApi, HttpClassifier, Verdict};
#[cfg(any(test, feature = "testing"))]
pub use clock::FixedClock;
pub use clock::{Clock, SystemClock, format_millis};
pub use config::Settings;
pub use connectivity::{Connectivity, ConnectivityMonitor};
pub use conversation::ConversationSession;
pub use model::{Conversation, Message, Sender};
pub use store::ConversationStore;

/// Result type used throughout the Spamscope library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Spamscope library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured storage errors from the backend module
    #[error(transparent)]
    Backend(backend::BackendError),

    /// Structured errors from the conversation store
    #[error(transparent)]
    Store(store::StoreError),

    /// Structured errors from the conversation session
    #[error(transparent)]
    Conversation(conversation::ConversationError),

    /// Structured errors from the classifier client
    #[error(transparent)]
    Client(classifier::ClientError),

    /// Structured errors from batch import
    #[error(transparent)]
    Batch(batch::BatchError),

    /// Rejected settings
    #[error(transparent)]
    Config(config::ConfigError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Backend(_) => "backend",
            Error::Store(_) => "store",
            Error::Conversation(_) => "conversation",
            Error::Client(_) => "classifier",
            Error::Batch(_) => "batch",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Conversation(err) => err.is_not_found(),
            Error::Batch(err) => err.is_not_found(),
            Error::Io(err) => err.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Backend(err) => err.is_io_error(),
            Error::Batch(err) => err.is_io_error(),
            _ => false,
        }
    }

    /// Check if this error comes from encoding or decoding stored data.
    pub fn is_serialization_error(&self) -> bool {
        match self {
            Error::Serialize(_) => true,
            Error::Backend(err) => err.is_serialization_error(),
            Error::Store(err) => err.is_serialization_error(),
            _ => false,
        }
    }

    /// Check if this error means a concurrent update could not be applied.
    pub fn is_concurrency_error(&self) -> bool {
        match self {
            Error::Store(err) => err.is_concurrency_error(),
            _ => false,
        }
    }

    /// Check if this error came from talking to the classifier.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Error::Client(_))
    }

    /// Check if the classifier could not be reached at all.
    pub fn is_connection_error(&self) -> bool {
        match self {
            Error::Client(err) => err.is_connection_error(),
            _ => false,
        }
    }

    /// Check if this error rejected an operation in the current state.
    pub fn is_operation_error(&self) -> bool {
        match self {
            Error::Batch(err) => err.is_operation_error(),
            _ => false,
        }
    }

    /// Check if this error is a configuration problem.
    pub fn is_config_error(&self) -> bool {
        match self {
            Error::Config(_) => true,
            Error::Client(err) => err.is_configuration_error(),
            _ => false,
        }
    }
}
