//! Conversation and message records.
//!
//! Stored as plain JSON, so a store file can be inspected or edited by hand.

use serde::{Deserialize, Serialize};

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Scammer,
    User,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::Scammer => "scammer",
            Sender::User => "user",
        }
    }
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Sender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scammer" => Ok(Sender::Scammer),
            "user" => Ok(Sender::User),
            other => Err(format!("unknown sender '{other}' (expected scammer or user)")),
        }
    }
}

/// A single message in a conversation. Never modified once appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub sender: Sender,
    pub text: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    /// Carried for imported emails; not rendered.
    #[serde(default)]
    pub title: Option<String>,
}

impl Message {
    /// Build a message with a fresh random id.
    pub fn new(sender: Sender, text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            sender,
            text: text.into(),
            timestamp,
            title: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// An ordered thread of messages between a scammer and the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            messages: Vec::new(),
        }
    }

    /// Most recent message written by `sender`.
    pub fn latest_from(&self, sender: Sender) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.sender == sender)
    }
}
