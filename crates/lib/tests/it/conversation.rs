//! ConversationSession workflows end to end.

use std::sync::Arc;

use spamscope::backend::JsonFile;
use spamscope::constants::{NO_REPLY_PLACEHOLDER, REPLY_ERROR_PLACEHOLDER};
use spamscope::conversation::AlwaysConfirm;
use spamscope::{ConversationSession, ConversationStore, FixedClock, HttpClassifier, Sender};

use crate::helpers::{dead_url, start_stub_server, test_session};

#[tokio::test]
async fn full_thread_with_generated_reply() {
    let server = start_stub_server().await;
    let api = HttpClassifier::new(server.url()).unwrap();
    let (mut session, _clock, _guard) = test_session().await;

    let conv = session.create().await.unwrap();
    session.set_edited_title("Lottery");
    session.rename(&conv.id).await.unwrap();

    session.set_scammer_draft("You won a prize, send fees");
    let reply = session.generate_reply(&api).await.unwrap();
    assert_eq!(reply, "Re: You won a prize, send fees");
    assert_eq!(session.reply_draft(), reply);

    session.submit_scammer().await.unwrap().unwrap();
    assert_eq!(session.scammer_draft(), "");
    assert_eq!(session.reply_draft(), "");

    // Without a draft the latest scammer message is the prompt
    let reply = session.generate_reply(&api).await.unwrap();
    assert_eq!(reply, "Re: You won a prize, send fees");
    session.submit_reply().await.unwrap().unwrap();

    let thread = session.selected().unwrap();
    assert_eq!(thread.title, "Lottery");
    let senders: Vec<_> = thread.messages.iter().map(|m| m.sender).collect();
    assert_eq!(senders, vec![Sender::Scammer, Sender::User]);
    assert!(thread.messages[0].timestamp < thread.messages[1].timestamp);
}

#[tokio::test]
async fn reply_placeholders_over_http() {
    let server = start_stub_server().await;
    let api = HttpClassifier::new(server.url()).unwrap();
    let (mut session, _clock, _guard) = test_session().await;
    session.create().await.unwrap();

    session.set_scammer_draft("stay silent");
    assert_eq!(
        session.generate_reply(&api).await.as_deref(),
        Some(NO_REPLY_PLACEHOLDER)
    );

    let offline = HttpClassifier::new(dead_url().await).unwrap();
    assert_eq!(
        session.generate_reply(&offline).await.as_deref(),
        Some(REPLY_ERROR_PLACEHOLDER)
    );
    // Nothing was stored by either attempt
    assert!(session.selected().unwrap().messages.is_empty());
}

#[tokio::test]
async fn state_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("spamscope.json");
    let clock = Arc::new(FixedClock::default());

    let (kept, dropped) = {
        let store = ConversationStore::new(Arc::new(JsonFile::open(&path).await.unwrap()));
        let mut session = ConversationSession::open(store, clock.clone()).await.unwrap();
        let kept = session.create().await.unwrap();
        session.add_message(Sender::Scammer, "  spaced  ").await.unwrap();
        let dropped = session.create().await.unwrap();
        session.delete(&dropped.id, &AlwaysConfirm).await.unwrap();
        (kept, dropped)
    };

    let store = ConversationStore::new(Arc::new(JsonFile::open(&path).await.unwrap()));
    let mut session = ConversationSession::open(store, clock.clone()).await.unwrap();
    let ids: Vec<_> = session.conversations().iter().map(|c| c.id.clone()).collect();
    assert_eq!(ids, vec![kept.id.clone()]);
    session.select(&kept.id).unwrap();
    assert_eq!(session.selected().unwrap().messages[0].text, "  spaced  ");

    // The deleted conversation's number is not handed out again
    let next = session.create().await.unwrap();
    assert_eq!(next.title, "Conversation 3");
    assert_ne!(next.id, dropped.id);
}

#[tokio::test]
async fn two_sessions_do_not_lose_each_others_writes() {
    let (mut first, clock, guard) = test_session().await;
    let store = ConversationStore::new(guard.backend.clone());
    let mut second = ConversationSession::open(store, clock.clone()).await.unwrap();

    let a = first.create().await.unwrap();
    let b = second.create().await.unwrap();

    // `first` never reloaded, yet its write must keep `b`
    first.add_message(Sender::Scammer, "to a").await.unwrap();
    second.add_message(Sender::User, "to b").await.unwrap();

    first.reload().await.unwrap();
    let list = first.conversations();
    assert_eq!(list.len(), 2);
    assert_eq!(list.iter().find(|c| c.id == a.id).unwrap().messages.len(), 1);
    assert_eq!(list.iter().find(|c| c.id == b.id).unwrap().messages.len(), 1);
}
