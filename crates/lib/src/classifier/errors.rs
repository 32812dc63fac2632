//! Error types for the classifier client.

use thiserror::Error;

/// Failures talking to the classifier service.
///
/// Callers in this crate collapse every variant into the same user-visible
/// outcome (placeholder text, errored row, cleared result). The variants exist
/// so logs and the CLI can say what actually went wrong.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum ClientError {
    /// The configured server URL is not a valid absolute URL.
    #[error("Invalid server URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// Transport-level failure (refused, reset, timed out).
    #[error("Failed to connect to {url}: {reason}")]
    Connection { url: String, reason: String },

    /// The service answered with a non-success status.
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    /// The body was not the expected shape.
    #[error("Malformed response: {reason}")]
    MalformedResponse { reason: String },
}

impl ClientError {
    /// Check if the service could not be reached at all.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, ClientError::Connection { .. })
    }

    /// Check if the service answered but rejected the request.
    pub fn is_status_error(&self) -> bool {
        matches!(self, ClientError::Status { .. })
    }

    /// Check if the service answered with something unusable.
    pub fn is_malformed(&self) -> bool {
        matches!(self, ClientError::MalformedResponse { .. })
    }

    /// Check if this is a local configuration problem.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidUrl { .. } | ClientError::ClientBuild(_)
        )
    }

    /// HTTP status, when the service answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<ClientError> for crate::Error {
    fn from(err: ClientError) -> Self {
        crate::Error::Client(err)
    }
}
