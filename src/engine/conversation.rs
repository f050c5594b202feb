//! Append-only chat message history
//!
//! A [`Conversation`] holds the messages exchanged in one chat session in
//! the order they were appended. Messages are immutable once created and
//! are never reordered or removed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Counselor,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Counselor => write!(f, "counselor"),
        }
    }
}

/// A single chat message
///
/// Fields are private so a message cannot change after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    id: String,
    sender: Sender,
    text: String,
    timestamp: DateTime<Utc>,
}

impl Message {
    /// Identifier derived from the creation timestamp, unique within the
    /// conversation
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// Trimmed message text, never empty
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Ordered message history for one chat session
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    last_id: Option<i64>,
}

impl Conversation {
    /// Creates an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message
    ///
    /// Text is trimmed; whitespace-only text is ignored and `None` is
    /// returned. The id is the timestamp in milliseconds, bumped past the
    /// previous id when two messages share a millisecond.
    ///
    /// # Arguments
    ///
    /// * `sender` - Who wrote the message
    /// * `text` - Raw message text
    /// * `timestamp` - Creation time
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::Utc;
    /// use helpline::engine::conversation::{Conversation, Sender};
    ///
    /// let mut conversation = Conversation::new();
    /// let now = Utc::now();
    /// assert!(conversation.append(Sender::User, "   ", now).is_none());
    ///
    /// let first = conversation.append(Sender::User, " Hej ", now).unwrap().id().to_string();
    /// let second = conversation.append(Sender::User, "Er du der?", now).unwrap().id().to_string();
    /// assert_ne!(first, second);
    /// assert_eq!(conversation.messages()[0].text(), "Hej");
    /// ```
    pub fn append(
        &mut self,
        sender: Sender,
        text: &str,
        timestamp: DateTime<Utc>,
    ) -> Option<&Message> {
        let text = text.trim();
        if text.is_empty() {
            tracing::debug!(%sender, "Ignoring empty message");
            return None;
        }

        let millis = timestamp.timestamp_millis();
        let id = match self.last_id {
            Some(last) if millis <= last => last + 1,
            _ => millis,
        };
        self.last_id = Some(id);

        self.messages.push(Message {
            id: id.to_string(),
            sender,
            text: text.to_string(),
            timestamp,
        });
        self.messages.last()
    }

    /// All messages in insertion order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Most recent message
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Number of messages
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// True when no message has been appended
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
