//! Test doubles for the classifier service.
//!
//! Only compiled for tests or with the `testing` feature.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::classifier::{Classification, ClassifierApi, ClientError, Verdict};

/// What [`FakeClassifier::classify`] answers for a matching text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FakeOutcome {
    /// Spam with the given spam probability.
    Spam(f64),
    /// Ham with the given ham probability.
    Ham(f64),
    /// Transport failure.
    Fail,
}

impl FakeOutcome {
    fn resolve(self) -> Result<Classification, ClientError> {
        match self {
            FakeOutcome::Spam(p) => Ok(Classification::new(Verdict::Spam, [1.0 - p, p])),
            FakeOutcome::Ham(p) => Ok(Classification::new(Verdict::Ham, [p, 1.0 - p])),
            FakeOutcome::Fail => Err(ClientError::Connection {
                url: "fake://classify".into(),
                reason: "scripted failure".into(),
            }),
        }
    }
}

/// Scriptable in-process classifier.
///
/// `classify` answers with the outcome of the first rule whose needle occurs
/// in the text, or the fallback. Every call is recorded, and the number of
/// requests in flight at once is tracked so tests can observe batching.
#[derive(Debug)]
pub struct FakeClassifier {
    online: AtomicBool,
    rules: Vec<(String, FakeOutcome)>,
    fallback: FakeOutcome,
    reply: Mutex<Option<String>>,
    delay: Duration,
    classified: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
    pings: AtomicUsize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    started_alongside: Mutex<Vec<usize>>,
}

impl Default for FakeClassifier {
    fn default() -> Self {
        Self {
            online: AtomicBool::new(true),
            rules: Vec::new(),
            fallback: FakeOutcome::Ham(0.9),
            reply: Mutex::new(Some("Please tell me more.".into())),
            delay: Duration::ZERO,
            classified: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
            pings: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            started_alongside: Mutex::new(Vec::new()),
        }
    }
}

impl FakeClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `outcome` for texts containing `needle`.
    pub fn rule(mut self, needle: impl Into<String>, outcome: FakeOutcome) -> Self {
        self.rules.push((needle.into(), outcome));
        self
    }

    /// Outcome when no rule matches.
    pub fn fallback(mut self, outcome: FakeOutcome) -> Self {
        self.fallback = outcome;
        self
    }

    /// Reply text for `generate_reply`; `None` makes it fail.
    pub fn reply(self, reply: Option<&str>) -> Self {
        *self.reply.lock().unwrap() = reply.map(str::to_string);
        self
    }

    /// Hold every classify call for `delay` before answering.
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }

    /// Texts passed to `classify`, in call order.
    pub fn classified(&self) -> Vec<String> {
        self.classified.lock().unwrap().clone()
    }

    /// Prompts passed to `generate_reply`.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    pub fn ping_count(&self) -> usize {
        self.pings.load(Ordering::SeqCst)
    }

    /// `classify` calls currently running.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// For each `classify` call in call order, how many others were already
    /// running when it started.
    pub fn started_alongside(&self) -> Vec<usize> {
        self.started_alongside.lock().unwrap().clone()
    }

    /// Highest number of concurrent `classify` calls observed.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ClassifierApi for FakeClassifier {
    async fn ping(&self) -> Result<(), ClientError> {
        self.pings.fetch_add(1, Ordering::SeqCst);
        if self.online.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(ClientError::Connection {
                url: "fake://ping".into(),
                reason: "offline".into(),
            })
        }
    }

    async fn classify(&self, text: &str) -> Result<Classification, ClientError> {
        self.classified.lock().unwrap().push(text.to_string());
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.started_alongside.lock().unwrap().push(running);
        self.peak_in_flight.fetch_max(running + 1, Ordering::SeqCst);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let outcome = self
            .rules
            .iter()
            .find(|(needle, _)| text.contains(needle.as_str()))
            .map(|(_, outcome)| *outcome)
            .unwrap_or(self.fallback);

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome.resolve()
    }

    async fn generate_reply(&self, prompt: &str) -> Result<String, ClientError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| ClientError::Status {
                status: 500,
                message: "generator unavailable".into(),
            })
    }
}
