//! ConversationStore over shared backends.

use std::collections::HashSet;
use std::sync::Arc;

use spamscope::backend::{Backend, JsonFile};
use spamscope::constants::CONVERSATIONS_KEY;
use spamscope::{Conversation, ConversationStore, FixedClock, Message, Sender};
use tokio::task::JoinSet;

use crate::helpers::test_store;

#[tokio::test]
async fn concurrent_creates_get_distinct_ids() {
    let (store, _guard) = test_store().await;
    let clock = Arc::new(FixedClock::new(1_000));
    let _hold = clock.hold();

    let mut set = JoinSet::new();
    for i in 0..8 {
        let store = store.clone();
        let clock = clock.clone();
        set.spawn(async move {
            store
                .create(clock.as_ref(), |id| Conversation::new(id, format!("Conversation {i}")))
                .await
        });
    }
    let mut ids = HashSet::new();
    while let Some(result) = set.join_next().await {
        ids.insert(result.unwrap().unwrap().id);
    }

    assert_eq!(ids.len(), 8);
    assert!(ids.contains("1000"));
    let listed: HashSet<_> = store.list().await.unwrap().into_iter().map(|c| c.id).collect();
    assert_eq!(listed, ids);
    for id in &ids {
        assert!(store.load(id).await.unwrap().is_some());
    }
}

#[tokio::test]
async fn two_stores_on_one_file_share_state() {
    let dir = tempfile::tempdir().unwrap();
    let backend: Arc<dyn Backend> = Arc::new(JsonFile::open(dir.path().join("s.json")).await.unwrap());
    let first = ConversationStore::new(backend.clone());
    let second = ConversationStore::new(backend);
    let clock = FixedClock::default();

    let created = first
        .create(&clock, |id| Conversation::new(id, "Shared"))
        .await
        .unwrap();
    let appended = second
        .update_list(|list| {
            let conv = list.iter_mut().find(|c| c.id == created.id).unwrap();
            conv.messages.push(Message::new(Sender::Scammer, "hello", 5));
            conv.clone()
        })
        .await
        .unwrap();
    second.save(&appended).await.unwrap();

    let seen = first.list().await.unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].messages[0].text, "hello");
    assert_eq!(first.load(&created.id).await.unwrap().unwrap().messages.len(), 1);
}

#[tokio::test]
async fn persisted_document_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("layout.json");
    let clock = FixedClock::new(42);
    {
        let store = ConversationStore::new(Arc::new(JsonFile::open(&path).await.unwrap()));
        store
            .create(&clock, |id| Conversation::new(id, "Layout"))
            .await
            .unwrap();
    }

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let entries = &raw["entries"];
    let list: Vec<Conversation> =
        serde_json::from_str(entries[CONVERSATIONS_KEY].as_str().unwrap()).unwrap();
    assert_eq!(list[0].id, "42");
    assert!(entries["conv:42"].is_string());
}

#[tokio::test]
async fn delete_removes_list_entry_and_record() {
    let (store, _guard) = test_store().await;
    let clock = FixedClock::default();
    let keep = store
        .create(&clock, |id| Conversation::new(id, "Keep"))
        .await
        .unwrap();
    let gone = store
        .create(&clock, |id| Conversation::new(id, "Gone"))
        .await
        .unwrap();

    assert!(store.delete(&gone.id).await.unwrap());
    assert!(!store.delete(&gone.id).await.unwrap());
    let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|c| c.id).collect();
    assert_eq!(ids, vec![keep.id]);
    assert!(store.load(&gone.id).await.unwrap().is_none());
}
