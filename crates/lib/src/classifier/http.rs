//! HTTP implementation of [`ClassifierApi`] using reqwest.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, trace};

use super::types::{ClassifyBody, ClassifyRequest, ErrorBody, ReplyBody, ReplyRequest};
use super::{Classification, ClassifierApi, ClientError};
use crate::constants::{CLASSIFY_PATH, DEFAULT_SERVER_URL, GENERATE_REPLY_PATH, PING_PATH};

/// Classifier client speaking JSON over HTTP.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: reqwest::Client,
    /// Validated origin without a trailing slash.
    base: String,
}

/// Builder for [`HttpClassifier`].
#[derive(Debug, Clone)]
pub struct HttpClassifierBuilder {
    base_url: String,
    timeout: Option<Duration>,
}

impl Default for HttpClassifierBuilder {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVER_URL.to_string(),
            timeout: None,
        }
    }
}

impl HttpClassifierBuilder {
    /// Origin of the service, e.g. `http://localhost:8000`.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Per-request timeout. Without one the transport default applies.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<HttpClassifier, ClientError> {
        let parsed = url::Url::parse(&self.base_url).map_err(|e| ClientError::InvalidUrl {
            url: self.base_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ClientError::InvalidUrl {
                url: self.base_url,
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::ClientBuild(e.to_string()))?;

        Ok(HttpClassifier {
            client,
            base: self.base_url.trim_end_matches('/').to_string(),
        })
    }
}

impl HttpClassifier {
    pub fn builder() -> HttpClassifierBuilder {
        HttpClassifierBuilder::default()
    }

    /// Client for `base_url` with transport-default timeouts.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::builder().base_url(base_url).build()
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<reqwest::Response, ClientError> {
        let response = request.send().await.map_err(|e| ClientError::Connection {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        // Prefer the service's own message; fall back to the status reason.
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(ErrorBody::message)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            });
        debug!(%url, status = status.as_u16(), %message, "Classifier request rejected");
        Err(ClientError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn post_json<B, R>(&self, path: &str, body: &B) -> Result<R, ClientError>
    where
        B: serde::Serialize + Sync + ?Sized,
        R: serde::de::DeserializeOwned,
    {
        let url = self.url(path);
        let response = self.send(self.client.post(&url).json(body), &url).await?;
        response
            .json::<R>()
            .await
            .map_err(|e| ClientError::MalformedResponse {
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl ClassifierApi for HttpClassifier {
    async fn ping(&self) -> Result<(), ClientError> {
        let url = self.url(PING_PATH);
        self.send(self.client.get(&url), &url).await?;
        trace!(%url, "Ping ok");
        Ok(())
    }

    async fn classify(&self, text: &str) -> Result<Classification, ClientError> {
        let body: ClassifyBody = self.post_json(CLASSIFY_PATH, &ClassifyRequest { text }).await?;
        body.try_into()
    }

    async fn generate_reply(&self, prompt: &str) -> Result<String, ClientError> {
        let body: ReplyBody = self
            .post_json(GENERATE_REPLY_PATH, &ReplyRequest { prompt })
            .await?;
        Ok(body.reply.unwrap_or_default())
    }
}
