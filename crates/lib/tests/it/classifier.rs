//! HttpClassifier against a stub service.

use std::sync::atomic::Ordering;
use std::time::Duration;

use spamscope::classifier::{ClassifierApi, ConfidenceBand, HttpClassifier, Verdict};
use spamscope::{Error, SpamCheck};

use crate::helpers::{dead_url, start_stub_server};

#[tokio::test]
async fn classify_spam_and_ham() {
    let server = start_stub_server().await;
    let api = HttpClassifier::new(format!("{}/", server.url())).unwrap();
    assert_eq!(api.base_url(), server.url());

    let spam = api.classify("Claim your prize now").await.unwrap();
    assert_eq!(spam.verdict, Verdict::Spam);
    assert_eq!(spam.probabilities, [0.08, 0.92]);
    assert_eq!(spam.confidence(), 0.92);
    assert_eq!(spam.band(), ConfidenceBand::High);

    let ham = api.classify("Lunch tomorrow?").await.unwrap();
    assert_eq!(ham.verdict, Verdict::Ham);
    assert_eq!(ham.confidence(), 0.85);
    assert_eq!(ham.band(), ConfidenceBand::Good);
    assert_eq!(server.stats.classified.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn service_errors_carry_the_message() {
    let server = start_stub_server().await;
    let api = HttpClassifier::new(server.url()).unwrap();

    let err = api.classify("crash please").await.unwrap_err();
    assert!(err.is_status_error());
    assert_eq!(err.status(), Some(500));
    assert!(err.to_string().contains("model exploded"));

    let err = api.classify("partial answer").await.unwrap_err();
    assert!(err.is_malformed());

    let top: Error = err.into();
    assert!(top.is_client_error());
    assert_eq!(top.module(), "classifier");
}

#[tokio::test]
async fn ping_and_reply() {
    let server = start_stub_server().await;
    let api = HttpClassifier::builder()
        .base_url(server.url())
        .timeout(Some(Duration::from_secs(5)))
        .build()
        .unwrap();

    api.ping().await.unwrap();
    assert_eq!(server.stats.pings.load(Ordering::SeqCst), 1);
    assert_eq!(api.generate_reply("hi").await.unwrap(), "Re: hi");
    // An absent reply field reads as empty
    assert_eq!(api.generate_reply("silent").await.unwrap(), "");
}

#[tokio::test]
async fn unreachable_service() {
    let api = HttpClassifier::new(dead_url().await).unwrap();
    let err = api.ping().await.unwrap_err();
    assert!(err.is_connection_error());
    let top: Error = api.classify("x").await.unwrap_err().into();
    assert!(top.is_connection_error());
}

#[tokio::test]
async fn spam_check_over_http() {
    let server = start_stub_server().await;
    let api = HttpClassifier::new(server.url()).unwrap();
    let mut check = SpamCheck::new();

    assert!(check.check(&api, "   ").await.is_none());
    assert_eq!(server.stats.classified.load(Ordering::SeqCst), 0);

    let result = check.check(&api, "a prize for you").await.unwrap();
    assert_eq!(result.verdict, Verdict::Spam);

    // A failed check clears the previous result
    assert!(check.check(&api, "crash").await.is_none());
    assert!(check.result().is_none());
}
