//! Error types for the key-value backends.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while reading or persisting backend state.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// Serializing the store contents failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// The persisted file could not be parsed.
    #[error("Deserialization of {path} failed")]
    DeserializationFailed {
        /// File that failed to parse
        path: PathBuf,
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// File I/O error.
    #[error("File I/O error on {path}")]
    FileIo {
        /// File being read or written
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl BackendError {
    /// Check if this error is related to I/O operations.
    pub fn is_io_error(&self) -> bool {
        matches!(self, BackendError::FileIo { .. })
    }

    /// Check if this error came from (de)serializing the store contents.
    pub fn is_serialization_error(&self) -> bool {
        matches!(
            self,
            BackendError::SerializationFailed { .. } | BackendError::DeserializationFailed { .. }
        )
    }

    /// Path of the file involved, when there is one.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            BackendError::DeserializationFailed { path, .. } | BackendError::FileIo { path, .. } => {
                Some(path)
            }
            BackendError::SerializationFailed { .. } => None,
        }
    }
}

impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
