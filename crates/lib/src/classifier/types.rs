//! Wire and result types for the classifier service.

use serde::{Deserialize, Serialize};

use super::ClientError;

/// The classifier's binary decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Ham,
    Spam,
}

impl Verdict {
    /// Map the service's class index (0 = ham, 1 = spam).
    pub fn from_class(class: i64) -> Option<Self> {
        match class {
            0 => Some(Verdict::Ham),
            1 => Some(Verdict::Spam),
            _ => None,
        }
    }

    pub fn class(&self) -> u8 {
        match self {
            Verdict::Ham => 0,
            Verdict::Spam => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Ham => "ham",
            Verdict::Spam => "spam",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse confidence grading used when presenting a probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    /// Below 0.5
    Low,
    /// 0.5 up to 0.7
    Fair,
    /// 0.7 up to 0.9
    Good,
    /// 0.9 and above
    High,
}

impl ConfidenceBand {
    pub fn of(probability: f64) -> Self {
        if probability < 0.5 {
            ConfidenceBand::Low
        } else if probability < 0.7 {
            ConfidenceBand::Fair
        } else if probability < 0.9 {
            ConfidenceBand::Good
        } else {
            ConfidenceBand::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceBand::Low => "low",
            ConfidenceBand::Fair => "fair",
            ConfidenceBand::Good => "good",
            ConfidenceBand::High => "high",
        }
    }
}

/// A successful classification.
///
/// Only ever produced from a well-formed success body; an error body cannot be
/// turned into one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Classification {
    pub verdict: Verdict,
    /// `[ham, spam]`
    pub probabilities: [f64; 2],
}

impl Classification {
    pub fn new(verdict: Verdict, probabilities: [f64; 2]) -> Self {
        Self {
            verdict,
            probabilities,
        }
    }

    /// The larger of the two class probabilities.
    pub fn confidence(&self) -> f64 {
        self.probabilities[0].max(self.probabilities[1])
    }

    pub fn band(&self) -> ConfidenceBand {
        ConfidenceBand::of(self.confidence())
    }

    pub fn ham_probability(&self) -> f64 {
        self.probabilities[0]
    }

    pub fn spam_probability(&self) -> f64 {
        self.probabilities[1]
    }
}

/// Success body of `POST /api/classify`.
///
/// The service also sends `label` and `confidence`; they are ignored in favour
/// of the class index and probabilities.
#[derive(Debug, Deserialize)]
pub(crate) struct ClassifyBody {
    predicted_class: Option<i64>,
    probabilities: Option<Vec<f64>>,
}

impl TryFrom<ClassifyBody> for Classification {
    type Error = ClientError;

    fn try_from(body: ClassifyBody) -> Result<Self, Self::Error> {
        let malformed = |reason: String| ClientError::MalformedResponse { reason };

        let class = body
            .predicted_class
            .ok_or_else(|| malformed("missing predicted_class".into()))?;
        let verdict = Verdict::from_class(class)
            .ok_or_else(|| malformed(format!("predicted_class {class} is not 0 or 1")))?;

        let probabilities = body
            .probabilities
            .ok_or_else(|| malformed("missing probabilities".into()))?;
        let probabilities: [f64; 2] = probabilities.try_into().map_err(|p: Vec<f64>| {
            malformed(format!("expected 2 probabilities, got {}", p.len()))
        })?;

        Ok(Classification::new(verdict, probabilities))
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ClassifyRequest<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ReplyRequest<'a> {
    pub prompt: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReplyBody {
    #[serde(default)]
    pub reply: Option<String>,
}

/// Error body. `error` is what the service documents; `detail` is what the
/// framework emits on validation failures.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    error: Option<String>,
    detail: Option<serde_json::Value>,
}

impl ErrorBody {
    pub(crate) fn message(self) -> Option<String> {
        self.error.or_else(|| match self.detail {
            Some(serde_json::Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
            None => None,
        })
    }
}
