//! Chat session state machine
//!
//! A session starts in [`ChatState::Queuing`] when a chat request has been
//! submitted, moves to [`ChatState::Connecting`] once the queue completes,
//! and to [`ChatState::Chatting`] when the counselor joins. A user may
//! leave a running chat, which ends it. Transitions only move forward.
//!
//! Both transition actions are safe to repeat: a second
//! [`ChatSession::begin_connecting`] keeps the counselor picked first, and
//! the welcome message is guarded by an explicit flag.

use crate::engine::conversation::{Conversation, Message, Sender};
use crate::roster::{Counselor, Roster};
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle of a chat session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatState {
    /// No chat has been requested yet
    Initial,
    /// Waiting in the simulated queue
    Queuing,
    /// A counselor has been picked and is joining
    Connecting,
    /// Counselor and user can exchange messages
    Chatting,
    /// The user left the chat
    Ended,
}

impl fmt::Display for ChatState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initial => write!(f, "initial"),
            Self::Queuing => write!(f, "queuing"),
            Self::Connecting => write!(f, "connecting"),
            Self::Chatting => write!(f, "chatting"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

/// Build the counselor's welcome text
///
/// # Examples
///
/// ```
/// use helpline::engine::session::welcome_text;
///
/// assert_eq!(
///     welcome_text("Anonym", "Maria"),
///     "Hej Anonym! Velkommen til Børnetelefonen. Jeg hedder Maria, og jeg er her for at lytte og hjælpe dig."
/// );
/// ```
pub fn welcome_text(display_name: &str, counselor_name: &str) -> String {
    format!(
        "Hej {}! Velkommen til Børnetelefonen. Jeg hedder {}, og jeg er her for at lytte og hjælpe dig.",
        display_name, counselor_name
    )
}

/// One user's chat with one counselor
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    state: ChatState,
    counselor: Option<Counselor>,
    welcome_sent: bool,
    conversation: Conversation,
}

impl ChatSession {
    /// Open a session waiting in the queue
    pub fn new() -> Self {
        let id = Uuid::new_v4();
        tracing::debug!(session = %id, "Chat session opened");
        Self {
            id,
            state: ChatState::Queuing,
            counselor: None,
            welcome_sent: false,
            conversation: Conversation::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    /// Counselor assigned to this session, once connecting
    pub fn counselor(&self) -> Option<&Counselor> {
        self.counselor.as_ref()
    }

    /// Whether the welcome message has been appended
    pub fn welcome_sent(&self) -> bool {
        self.welcome_sent
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Leave the queue and pick a counselor
    ///
    /// Only acts on a queuing session; returns the newly assigned counselor,
    /// or `None` when the session was already past the queue. An empty
    /// roster leaves the session connecting without a counselor.
    pub fn begin_connecting<R: Rng + ?Sized>(
        &mut self,
        roster: &Roster,
        rng: &mut R,
    ) -> Option<&Counselor> {
        if self.state != ChatState::Queuing {
            tracing::debug!(session = %self.id, state = %self.state, "Ignoring repeated connect");
            return None;
        }

        self.state = ChatState::Connecting;
        self.counselor = roster.pick_counselor(rng).cloned();
        match &self.counselor {
            Some(counselor) => {
                tracing::info!(session = %self.id, counselor = %counselor.name, "Counselor assigned");
            }
            None => {
                tracing::warn!(session = %self.id, "No counselor available to assign");
            }
        }
        self.counselor.as_ref()
    }

    /// Open the chat and send the welcome message
    ///
    /// Moves a connecting session with a counselor to chatting. The welcome
    /// message is appended at most once per session, however often this is
    /// called; the return value is the welcome message when it was appended
    /// by this call.
    ///
    /// # Arguments
    ///
    /// * `display_name` - Name the counselor greets the user with
    /// * `timestamp` - Creation time of the welcome message
    pub fn enter_chatting(
        &mut self,
        display_name: &str,
        timestamp: DateTime<Utc>,
    ) -> Option<&Message> {
        let counselor_name = match (&self.state, &self.counselor) {
            (ChatState::Connecting | ChatState::Chatting, Some(counselor)) => counselor.name.clone(),
            _ => {
                tracing::debug!(session = %self.id, state = %self.state, "Cannot enter chatting");
                return None;
            }
        };

        if self.state == ChatState::Connecting {
            self.state = ChatState::Chatting;
            tracing::info!(session = %self.id, "Chat opened");
        }

        if self.welcome_sent {
            return None;
        }
        self.welcome_sent = true;
        self.conversation.append(
            Sender::Counselor,
            &welcome_text(display_name, &counselor_name),
            timestamp,
        )
    }

    /// Append a message written by the user
    ///
    /// Only a chatting session accepts messages; empty text is ignored.
    pub fn send_user_message(&mut self, text: &str, timestamp: DateTime<Utc>) -> Option<&Message> {
        if self.state != ChatState::Chatting {
            tracing::debug!(session = %self.id, state = %self.state, "Message rejected");
            return None;
        }
        self.conversation.append(Sender::User, text, timestamp)
    }

    /// Leave a running chat
    ///
    /// Returns false unless the session was chatting.
    pub fn end(&mut self) -> bool {
        if self.state != ChatState::Chatting {
            return false;
        }
        self.state = ChatState::Ended;
        tracing::info!(
            session = %self.id,
            messages = self.conversation.len(),
            "Chat ended"
        );
        true
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
