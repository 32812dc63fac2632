//! Classifier reachability indicator.
//!
//! [`ConnectivityMonitor`] pings the classifier once on start and then on a
//! fixed interval, publishing the latest result through a watch channel.
//! Nothing is retried between ticks and no failure is surfaced beyond the
//! state itself.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{Instrument, debug, info, info_span};

use crate::classifier::ClassifierApi;

/// Last known reachability of the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// No probe has finished yet.
    #[default]
    Unknown,
    Connected,
    Disconnected,
}

impl Connectivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Connectivity::Unknown => "unknown",
            Connectivity::Connected => "connected",
            Connectivity::Disconnected => "disconnected",
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, Connectivity::Connected)
    }
}

impl std::fmt::Display for Connectivity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ping once. Any failure, including a non-success status, is `Disconnected`.
pub async fn probe(api: &dyn ClassifierApi) -> Connectivity {
    match api.ping().await {
        Ok(()) => Connectivity::Connected,
        Err(e) => {
            debug!("Ping failed: {e}");
            Connectivity::Disconnected
        }
    }
}

/// Background task that keeps a [`Connectivity`] value current.
///
/// The task is aborted when the monitor is stopped or dropped.
#[derive(Debug)]
pub struct ConnectivityMonitor {
    state: watch::Receiver<Connectivity>,
    task: JoinHandle<()>,
}

impl ConnectivityMonitor {
    /// Start probing `api` now and every `every` after that.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(api: Arc<dyn ClassifierApi>, every: Duration) -> Self {
        let (tx, rx) = watch::channel(Connectivity::Unknown);
        let span = info_span!("connectivity", interval_ms = every.as_millis() as u64);

        let task = tokio::spawn(
            async move {
                let mut ticker = interval(every);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
                loop {
                    ticker.tick().await;
                    let next = probe(api.as_ref()).await;
                    // Receivers are only woken when the state actually moves
                    tx.send_if_modified(|current| {
                        if *current == next {
                            return false;
                        }
                        info!(from = %current, to = %next, "Classifier connectivity changed");
                        *current = next;
                        true
                    });
                    if tx.is_closed() {
                        debug!("No watchers left, stopping");
                        break;
                    }
                }
            }
            .instrument(span),
        );

        Self { state: rx, task }
    }

    /// Latest published state.
    pub fn state(&self) -> Connectivity {
        *self.state.borrow()
    }

    /// A receiver that observes every future change.
    pub fn subscribe(&self) -> watch::Receiver<Connectivity> {
        self.state.clone()
    }

    /// Wait for the next published state that differs from the last one seen.
    ///
    /// Returns `None` once the probing task has ended.
    pub async fn changed(&mut self) -> Option<Connectivity> {
        self.state.changed().await.ok()?;
        Some(*self.state.borrow_and_update())
    }

    /// Stop probing. The last state stays readable through existing receivers.
    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for ConnectivityMonitor {
    fn drop(&mut self) {
        self.task.abort();
    }
}
