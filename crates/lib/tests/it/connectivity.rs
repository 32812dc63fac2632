//! ConnectivityMonitor against real endpoints.

use std::sync::Arc;
use std::time::Duration;

use spamscope::HttpClassifier;
use spamscope::connectivity::{Connectivity, ConnectivityMonitor, probe};

use crate::helpers::{dead_url, start_stub_server};

#[tokio::test]
async fn live_server_reads_connected() {
    let server = start_stub_server().await;
    let api = Arc::new(HttpClassifier::new(server.url()).unwrap());
    assert_eq!(probe(api.as_ref()).await, Connectivity::Connected);

    let mut monitor = ConnectivityMonitor::spawn(api, Duration::from_millis(50));
    let state = tokio::time::timeout(Duration::from_secs(5), monitor.changed())
        .await
        .unwrap();
    assert_eq!(state, Some(Connectivity::Connected));
}

#[tokio::test]
async fn dead_endpoint_reads_disconnected() {
    let api = Arc::new(HttpClassifier::new(dead_url().await).unwrap());
    let mut monitor = ConnectivityMonitor::spawn(api, Duration::from_millis(50));
    let state = tokio::time::timeout(Duration::from_secs(5), monitor.changed())
        .await
        .unwrap();
    assert_eq!(state, Some(Connectivity::Disconnected));
    assert!(!monitor.state().is_connected());
}
