//! Behaviour every Backend must share.

use std::sync::Arc;

use spamscope::backend::{Backend, InMemory, JsonFile};
use tokio::task::JoinSet;

use crate::helpers::test_backend;

async fn assert_contract(backend: &dyn Backend) {
    assert_eq!(backend.get("k").await.unwrap(), None);
    backend.set("k", "v1".into()).await.unwrap();
    assert_eq!(backend.get("k").await.unwrap().as_deref(), Some("v1"));

    // Wrong expectation leaves the value alone
    assert!(!backend.compare_and_swap("k", Some("v0"), "x".into()).await.unwrap());
    assert!(!backend.compare_and_swap("k", None, "x".into()).await.unwrap());
    assert!(backend.compare_and_swap("k", Some("v1"), "v2".into()).await.unwrap());
    assert_eq!(backend.get("k").await.unwrap().as_deref(), Some("v2"));

    assert!(backend.compare_and_swap("fresh", None, "1".into()).await.unwrap());
    let mut keys = backend.keys().await.unwrap();
    keys.sort();
    assert_eq!(keys, vec!["fresh".to_string(), "k".to_string()]);

    assert!(backend.remove("k").await.unwrap());
    assert!(!backend.remove("k").await.unwrap());
}

#[tokio::test]
async fn in_memory_contract() {
    assert_contract(&InMemory::new()).await;
}

#[tokio::test]
async fn json_file_contract() {
    let dir = tempfile::tempdir().unwrap();
    let backend = JsonFile::open(dir.path().join("store.json")).await.unwrap();
    assert_contract(&backend).await;
}

#[tokio::test]
async fn configured_backend_contract() {
    let guard = test_backend().await;
    assert_contract(guard.backend.as_ref()).await;
}

#[tokio::test]
async fn json_file_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("store.json");
    {
        let backend = JsonFile::open(&path).await.unwrap();
        backend.set("a", "1".into()).await.unwrap();
        backend.set("b", "2".into()).await.unwrap();
        backend.remove("b").await.unwrap();
    }
    let reopened = JsonFile::open(&path).await.unwrap();
    assert_eq!(reopened.get("a").await.unwrap().as_deref(), Some("1"));
    assert_eq!(reopened.get("b").await.unwrap(), None);
}

#[tokio::test]
async fn compare_and_swap_admits_one_winner() {
    let backend: Arc<dyn Backend> = Arc::new(InMemory::new());
    let mut set = JoinSet::new();
    for i in 0..16 {
        let backend = backend.clone();
        set.spawn(async move { backend.compare_and_swap("slot", None, i.to_string()).await });
    }
    let mut winners = 0;
    while let Some(result) = set.join_next().await {
        if result.unwrap().unwrap() {
            winners += 1;
        }
    }
    assert_eq!(winners, 1);
}
