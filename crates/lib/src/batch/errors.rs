//! Error types for batch import.

use std::path::PathBuf;

use thiserror::Error;

use super::RowStatus;

/// Errors raised while loading or promoting batch rows.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BatchError {
    /// A selected file or directory could not be read.
    #[error("Failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Row index out of range.
    #[error("No row at index {index}")]
    NoSuchRow { index: usize },

    /// Only classified rows can become conversations.
    #[error("Row '{path}' is {status} and cannot be promoted")]
    NotPromotable { path: String, status: RowStatus },
}

impl BatchError {
    /// Check if this error is related to I/O operations.
    pub fn is_io_error(&self) -> bool {
        matches!(self, BatchError::Read { .. })
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            BatchError::NoSuchRow { .. } => true,
            BatchError::Read { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            BatchError::NotPromotable { .. } => false,
        }
    }

    /// Check if this error rejected an operation on a row in the wrong state.
    pub fn is_operation_error(&self) -> bool {
        matches!(self, BatchError::NotPromotable { .. })
    }
}

impl From<BatchError> for crate::Error {
    fn from(err: BatchError) -> Self {
        crate::Error::Batch(err)
    }
}
