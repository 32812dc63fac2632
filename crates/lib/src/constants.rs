//! Constants used throughout the Spamscope library.
//!
//! This module provides central definitions for store keys, classifier
//! endpoints and the default tuning values of the batch workflow.

/// Store key holding the full list of conversations.
pub const CONVERSATIONS_KEY: &str = "conversations";

/// Prefix for per-conversation records (`conv:{id}`).
pub const CONVERSATION_PREFIX: &str = "conv:";

/// Store key holding the highest default conversation number handed out.
pub const TITLE_COUNTER_KEY: &str = "title_counter";

/// Default origin of the classifier service.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// Liveness endpoint.
pub const PING_PATH: &str = "/api/ping";

/// Classification endpoint.
pub const CLASSIFY_PATH: &str = "/api/classify";

/// Reply generation endpoint.
pub const GENERATE_REPLY_PATH: &str = "/api/generate-reply";

/// Number of classification requests dispatched concurrently per group.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Character budget of a file preview.
pub const PREVIEW_CHARS: usize = 100;

/// Seconds between connectivity probes.
pub const DEFAULT_PING_INTERVAL_SECS: u64 = 5;

/// Name of the persisted store file inside the data directory.
pub const STORE_FILE: &str = "spamscope.json";

/// Reply draft placeholder when the generator answered with nothing.
pub const NO_REPLY_PLACEHOLDER: &str = "(No reply generated)";

/// Reply draft placeholder when reply generation failed.
pub const REPLY_ERROR_PLACEHOLDER: &str = "(Error generating reply)";

/// Upper bound on optimistic retries when updating the conversation list.
pub const MAX_INDEX_RETRIES: usize = 16;
