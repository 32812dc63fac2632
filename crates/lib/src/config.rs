//! Runtime settings shared by the library and the command line.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::batch::{BatchOptions, ClassifyInput};
use crate::constants::{
    DEFAULT_BATCH_SIZE, DEFAULT_PING_INTERVAL_SECS, DEFAULT_SERVER_URL, PREVIEW_CHARS, STORE_FILE,
};

/// Errors raised when settings are inconsistent.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Groups must hold at least one request.
    #[error("Batch size must be at least 1")]
    InvalidBatchSize,

    /// Probing on a zero interval would spin.
    #[error("Ping interval must be at least 1 second")]
    InvalidPingInterval,
}

impl ConfigError {
    /// Check if this error rejects a numeric setting.
    pub fn is_out_of_range(&self) -> bool {
        matches!(
            self,
            ConfigError::InvalidBatchSize | ConfigError::InvalidPingInterval
        )
    }
}

impl From<ConfigError> for crate::Error {
    fn from(err: ConfigError) -> Self {
        crate::Error::Config(err)
    }
}

/// Settings with their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server_url: String,
    /// Directory holding the conversation store file.
    pub data_dir: PathBuf,
    pub batch_size: usize,
    pub preview_chars: usize,
    pub classify_using: ClassifyInput,
    pub ping_interval_secs: u64,
    /// `None` leaves the HTTP client's own default in place.
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            data_dir: PathBuf::from("."),
            batch_size: DEFAULT_BATCH_SIZE,
            preview_chars: PREVIEW_CHARS,
            classify_using: ClassifyInput::Preview,
            ping_interval_secs: DEFAULT_PING_INTERVAL_SECS,
            request_timeout_secs: None,
        }
    }
}

impl Settings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize);
        }
        if self.ping_interval_secs == 0 {
            return Err(ConfigError::InvalidPingInterval);
        }
        Ok(())
    }

    /// Path of the JSON store file.
    pub fn store_path(&self) -> PathBuf {
        store_path_in(&self.data_dir)
    }

    pub fn batch_options(&self) -> BatchOptions {
        BatchOptions {
            batch_size: self.batch_size,
            preview_chars: self.preview_chars,
            classify_using: self.classify_using,
        }
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn store_path_in(dir: &Path) -> PathBuf {
    dir.join(STORE_FILE)
}
