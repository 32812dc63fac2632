//! Store and classifier construction from settings.

use std::sync::Arc;

use spamscope::backend::JsonFile;
use spamscope::{ConversationStore, HttpClassifier, Settings};

/// Open the JSON store file under the configured data directory.
pub async fn open_store(
    settings: &Settings,
) -> Result<ConversationStore, Box<dyn std::error::Error>> {
    let path = settings.store_path();
    tracing::debug!("Using store file at {}", path.display());
    let backend = JsonFile::open(&path).await?;
    Ok(ConversationStore::new(Arc::new(backend)))
}

/// HTTP client for the configured classifier service.
pub fn classifier(settings: &Settings) -> Result<HttpClassifier, Box<dyn std::error::Error>> {
    let client = HttpClassifier::builder()
        .base_url(settings.server_url.clone())
        .timeout(settings.request_timeout())
        .build()?;
    Ok(client)
}
