//! Client for the external spam classifier / reply generator.
//!
//! The service is opaque: three JSON endpoints on a fixed origin. Everything
//! that talks to it goes through [`ClassifierApi`] so sessions can be driven by
//! a fake in tests.

use async_trait::async_trait;

mod errors;
mod http;
mod types;

pub use errors::ClientError;
pub use http::{HttpClassifier, HttpClassifierBuilder};
pub use types::{Classification, ConfidenceBand, Verdict};

/// Operations offered by the classifier service.
#[async_trait]
pub trait ClassifierApi: Send + Sync {
    /// Liveness probe. Any success status is `Ok`.
    async fn ping(&self) -> Result<(), ClientError>;

    /// Classify `text` as spam or ham.
    async fn classify(&self, text: &str) -> Result<Classification, ClientError>;

    /// Ask the generator for a reply to `prompt`.
    async fn generate_reply(&self, prompt: &str) -> Result<String, ClientError>;
}
