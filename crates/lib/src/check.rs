//! Single-message spam check.

use tracing::{debug, warn};

use crate::classifier::{Classification, ClassifierApi};

/// Holds the result of the most recent single-message check.
#[derive(Debug, Default, Clone)]
pub struct SpamCheck {
    result: Option<Classification>,
}

impl SpamCheck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn result(&self) -> Option<&Classification> {
        self.result.as_ref()
    }

    /// Classify `text`, replacing any previous result.
    ///
    /// Blank text is ignored and leaves the previous result in place. Any
    /// failure clears the result.
    pub async fn check(
        &mut self,
        api: &dyn ClassifierApi,
        text: &str,
    ) -> Option<&Classification> {
        if text.trim().is_empty() {
            return self.result.as_ref();
        }
        self.result = match api.classify(text).await {
            Ok(classification) => {
                debug!(
                    verdict = %classification.verdict,
                    confidence = classification.confidence(),
                    "Checked message"
                );
                Some(classification)
            }
            Err(e) => {
                warn!("Spam check failed: {e}");
                None
            }
        };
        self.result.as_ref()
    }
}
