//! Conversation review session.
//!
//! [`ConversationSession`] holds what the conversation view works with: the
//! list of conversations, which one is selected, the rename buffer, and the two
//! draft fields (the pasted scammer email and the reply being written). Every
//! mutation is applied to the store through an optimistic list update and the
//! session then adopts the stored list, so changes made elsewhere (for example
//! batch promotions) are picked up instead of overwritten.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::Result;
use crate::classifier::ClassifierApi;
use crate::clock::Clock;
use crate::constants::{NO_REPLY_PLACEHOLDER, REPLY_ERROR_PLACEHOLDER};
use crate::model::{Conversation, Message, Sender};
use crate::store::ConversationStore;

mod errors;
pub use errors::ConversationError;


/// Interactive yes/no confirmation, asked before destructive actions.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

/// Confirms everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        true
    }
}

/// Declines everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverConfirm;

impl Confirm for NeverConfirm {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}

/// State of one conversation review session.
#[derive(Debug)]
pub struct ConversationSession {
    store: ConversationStore,
    clock: Arc<dyn Clock>,
    conversations: Vec<Conversation>,
    selected: Option<String>,
    editing: Option<String>,
    edited_title: String,
    scammer_draft: String,
    reply_draft: String,
}

impl ConversationSession {
    /// Start a session from the stored conversation list.
    pub async fn open(store: ConversationStore, clock: Arc<dyn Clock>) -> Result<Self> {
        let conversations = store.list().await?;
        debug!(count = conversations.len(), "Loaded conversations");
        Ok(Self {
            store,
            clock,
            conversations,
            selected: None,
            editing: None,
            edited_title: String::new(),
            scammer_draft: String::new(),
            reply_draft: String::new(),
        })
    }

    /// Re-read the list from the store, dropping a selection that vanished.
    pub async fn reload(&mut self) -> Result<()> {
        self.adopt(self.store.list().await?);
        Ok(())
    }

    fn adopt(&mut self, list: Vec<Conversation>) {
        self.conversations = list;
        if let Some(id) = &self.selected
            && !self.conversations.iter().any(|c| &c.id == id)
        {
            self.selected = None;
        }
        if let Some(id) = &self.editing
            && !self.conversations.iter().any(|c| &c.id == id)
        {
            self.editing = None;
        }
    }

    fn find(&self, id: &str) -> Result<&Conversation> {
        self.conversations
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| ConversationError::NotFound { id: id.to_string() }.into())
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected(&self) -> Option<&Conversation> {
        let id = self.selected.as_deref()?;
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Id of the conversation in rename mode.
    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn edited_title(&self) -> &str {
        &self.edited_title
    }

    pub fn set_edited_title(&mut self, title: impl Into<String>) {
        self.edited_title = title.into();
    }

    pub fn scammer_draft(&self) -> &str {
        &self.scammer_draft
    }

    pub fn set_scammer_draft(&mut self, text: impl Into<String>) {
        self.scammer_draft = text.into();
    }

    pub fn reply_draft(&self) -> &str {
        &self.reply_draft
    }

    pub fn set_reply_draft(&mut self, text: impl Into<String>) {
        self.reply_draft = text.into();
    }

    /// Create an empty conversation, select it and enter rename mode.
    ///
    /// The default title numbers conversations by how many records exist,
    /// never reusing a number freed by a delete.
    pub async fn create(&mut self) -> Result<Conversation> {
        let number = self.store.next_title_number().await?;
        let title = format!("Conversation {number}");
        let conversation = self
            .store
            .create(self.clock.as_ref(), |id| Conversation::new(id, title.clone()))
            .await?;
        info!(id = %conversation.id, title = %conversation.title, "New conversation");

        self.reload().await?;
        self.selected = Some(conversation.id.clone());
        self.editing = Some(conversation.id.clone());
        self.edited_title = conversation.title.clone();
        Ok(conversation)
    }

    /// Select `id` and load its title into the rename buffer.
    pub fn select(&mut self, id: &str) -> Result<()> {
        let title = self.find(id)?.title.clone();
        self.selected = Some(id.to_string());
        self.edited_title = title;
        Ok(())
    }

    /// Enter rename mode for `id`.
    pub fn begin_rename(&mut self, id: &str) -> Result<()> {
        let title = self.find(id)?.title.clone();
        self.editing = Some(id.to_string());
        self.edited_title = title;
        Ok(())
    }

    /// Apply the rename buffer to `id` and leave rename mode.
    ///
    /// The buffer is trimmed; a blank result keeps the previous title.
    /// Returns the title the conversation ends up with.
    pub async fn rename(&mut self, id: &str) -> Result<String> {
        self.find(id)?;
        let new_title = self.edited_title.trim().to_string();
        self.editing = None;

        if new_title.is_empty() {
            debug!(%id, "Blank title, keeping the previous one");
            return Ok(self.find(id)?.title.clone());
        }

        let (list, updated) = self
            .store
            .update_list(|list| {
                let mut updated = None;
                if let Some(c) = list.iter_mut().find(|c| c.id == id) {
                    c.title = new_title.clone();
                    updated = Some(c.clone());
                }
                (list.clone(), updated)
            })
            .await?;
        if let Some(conversation) = &updated {
            self.store.save(conversation).await?;
        }
        self.adopt(list);
        Ok(self.find(id)?.title.clone())
    }

    /// Delete `id` after asking `confirm`. Returns whether it was deleted.
    pub async fn delete(&mut self, id: &str, confirm: &dyn Confirm) -> Result<bool> {
        let title = self.find(id)?.title.clone();
        if !confirm.confirm(&format!("Delete conversation \"{title}\"?")) {
            debug!(%id, "Delete declined");
            return Ok(false);
        }

        self.store.delete(id).await?;
        info!(%id, "Deleted conversation");
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        self.reload().await?;
        Ok(true)
    }

    /// Append a message to the selected conversation.
    ///
    /// Does nothing (returns `None`) when no conversation is selected or the
    /// text is blank. The text itself is stored untrimmed.
    pub async fn add_message(&mut self, sender: Sender, text: &str) -> Result<Option<Message>> {
        let Some(id) = self.selected.clone() else {
            return Ok(None);
        };
        if text.trim().is_empty() {
            return Ok(None);
        }

        let message = Message::new(sender, text, self.clock.now_millis());
        let (list, updated) = self
            .store
            .update_list(|list| {
                let mut updated = None;
                if let Some(c) = list.iter_mut().find(|c| c.id == id) {
                    c.messages.push(message.clone());
                    updated = Some(c.clone());
                }
                (list.clone(), updated)
            })
            .await?;

        let appended = match &updated {
            Some(conversation) => {
                self.store.save(conversation).await?;
                debug!(%id, %sender, "Appended message");
                Some(message)
            }
            None => {
                warn!(%id, "Selected conversation disappeared from the store");
                None
            }
        };
        self.adopt(list);
        Ok(appended)
    }

    /// Add the scammer draft as a message and clear both drafts.
    pub async fn submit_scammer(&mut self) -> Result<Option<Message>> {
        let text = std::mem::take(&mut self.scammer_draft);
        self.reply_draft.clear();
        self.add_message(Sender::Scammer, &text).await
    }

    /// Add the reply draft as a message and clear it.
    pub async fn submit_reply(&mut self) -> Result<Option<Message>> {
        let text = std::mem::take(&mut self.reply_draft);
        self.add_message(Sender::User, &text).await
    }

    /// Prompt for reply generation: the scammer draft if it has content,
    /// otherwise the latest scammer message of the selected conversation.
    pub fn reply_prompt(&self) -> Option<String> {
        let selected = self.selected()?;
        if !self.scammer_draft.trim().is_empty() {
            return Some(self.scammer_draft.clone());
        }
        selected
            .latest_from(Sender::Scammer)
            .map(|m| m.text.clone())
            .filter(|t| !t.trim().is_empty())
    }

    /// Ask the generator for a reply and put it in the reply draft.
    ///
    /// Returns `None` without a request when there is nothing to reply to.
    /// Failures are not retried; they leave a placeholder in the draft.
    pub async fn generate_reply(&mut self, api: &dyn ClassifierApi) -> Option<String> {
        let prompt = self.reply_prompt()?;
        let reply = match api.generate_reply(&prompt).await {
            Ok(reply) if reply.is_empty() => NO_REPLY_PLACEHOLDER.to_string(),
            Ok(reply) => reply,
            Err(e) => {
                warn!("Error generating reply: {e}");
                REPLY_ERROR_PLACEHOLDER.to_string()
            }
        };
        self.reply_draft = reply.clone();
        Some(reply)
    }
}
