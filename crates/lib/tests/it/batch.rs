//! Batch import from disk through classification and promotion.

use std::sync::Arc;
use std::sync::atomic::Ordering;

use spamscope::batch::{BatchOptions, BatchSession, ClassifyInput, RowStatus, SortKey, SortState};
use spamscope::{ConversationSession, FixedClock, HttpClassifier};

use crate::helpers::{start_stub_server, test_store};

fn write_inbox(dir: &std::path::Path, count: usize) -> std::path::PathBuf {
    let inbox = dir.join("inbox");
    std::fs::create_dir_all(&inbox).unwrap();
    for i in 0..count {
        let body = match i % 3 {
            0 => format!("Subject: You won!\n\nClaim your prize number {i}"),
            1 => format!("Subject: Minutes\n\nNotes from meeting {i}"),
            _ => format!("Subject: Oops\n\nThis will crash {i}"),
        };
        std::fs::write(inbox.join(format!("{i:02}.eml")), body).unwrap();
    }
    inbox
}

#[tokio::test]
async fn classify_folder_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let inbox = write_inbox(dir.path(), 12);
    let server = start_stub_server().await;
    let api = Arc::new(HttpClassifier::new(server.url()).unwrap());

    let mut batch = BatchSession::load(&[&inbox], BatchOptions::default()).await.unwrap();
    assert_eq!(batch.len(), 12);
    assert!(batch.rows().iter().all(|r| r.status == RowStatus::Pending));
    assert_eq!(batch.rows()[0].path, "inbox/00.eml");

    let report = batch.classify_all(api).await;
    assert_eq!(report.groups, 2);
    assert_eq!((report.spam, report.ham, report.errors), (4, 4, 4));
    assert_eq!(server.stats.classified.load(Ordering::SeqCst), 12);

    let row = batch.row_by_path("inbox/00.eml").unwrap();
    assert_eq!(row.status, RowStatus::Spam);
    assert_eq!(row.confidence, Some(0.92));
    assert_eq!(row.predicted_class, Some(1));
    assert_eq!(row.probabilities, Some([0.08, 0.92]));

    let errored = batch.row_by_path("inbox/02.eml").unwrap();
    assert_eq!(errored.status, RowStatus::Error);
    assert_eq!(errored.confidence, None);
}

#[tokio::test]
async fn reclassify_resets_rows_and_sorting_orders_them() {
    let dir = tempfile::tempdir().unwrap();
    let inbox = write_inbox(dir.path(), 6);
    let server = start_stub_server().await;
    let api = Arc::new(HttpClassifier::new(server.url()).unwrap());
    let options = BatchOptions {
        batch_size: 4,
        classify_using: ClassifyInput::Full,
        ..BatchOptions::default()
    };

    let mut batch = BatchSession::load(&[&inbox], options).await.unwrap();
    batch.classify_all(api.clone()).await;
    let report = batch.classify_all(api).await;
    assert_eq!(report.groups, 2);
    assert_eq!(report.spam + report.ham + report.errors, 6);

    // Every header click flips the direction, so the first one leaves us descending
    let mut state = SortState::default();
    state.toggle(SortKey::Confidence);
    assert!(!state.ascending);
    let by_confidence: Vec<_> = batch
        .sorted(state)
        .into_iter()
        .filter_map(|r| r.confidence)
        .collect();
    // Errored rows have no confidence and hold their place between the others
    assert_eq!(by_confidence, vec![0.92, 0.85, 0.92, 0.85]);

    let statuses: Vec<_> = batch
        .sorted(SortState::new(SortKey::Status, false))
        .into_iter()
        .map(|r| r.status)
        .collect();
    assert_eq!(statuses.first(), Some(&RowStatus::Spam));
    assert_eq!(statuses.last(), Some(&RowStatus::Error));
}

#[tokio::test]
async fn promoted_spam_appears_in_open_session() {
    let dir = tempfile::tempdir().unwrap();
    let inbox = write_inbox(dir.path(), 5);
    let server = start_stub_server().await;
    let api = Arc::new(HttpClassifier::new(server.url()).unwrap());
    let (store, _guard) = test_store().await;
    let clock = Arc::new(FixedClock::default());

    let mut session = ConversationSession::open(store.clone(), clock.clone()).await.unwrap();
    let manual = session.create().await.unwrap();

    let mut batch = BatchSession::load(&[&inbox], BatchOptions::default()).await.unwrap();
    batch.classify_all(api).await;
    let promoted = batch.promote_all_spam(&store, clock.as_ref()).await.unwrap();
    let titles: Vec<_> = promoted.iter().map(|c| c.title.as_str()).collect();
    assert_eq!(titles, vec!["00.eml", "03.eml"]);
    for (conversation, path) in promoted.iter().zip(["inbox/00.eml", "inbox/03.eml"]) {
        let row = batch.row_by_path(path).unwrap();
        assert_eq!(conversation.messages.len(), 1);
        assert_eq!(conversation.messages[0].text, row.full_text);
    }
    assert_eq!(
        promoted[0].messages[0].title.as_deref(),
        Some("Subject: You won! Claim your prize number 0")
    );

    // The session's own next write must not drop the promoted conversations
    session.add_message(spamscope::Sender::User, "hello").await.unwrap();
    let ids: Vec<_> = session.conversations().iter().map(|c| c.id.clone()).collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids[0], manual.id);
}
