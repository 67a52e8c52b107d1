// ABOUTME: Conversation store — the ordered, append-only message history of a session.
// ABOUTME: Every append re-serializes the full history to storage; restore runs once at startup.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::session::SessionId;
use crate::storage::KeyValueStore;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A single chat message. Never edited after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub sender: Sender,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            text: text.into(),
        }
    }
}

/// On-disk shape of a persisted history.
#[derive(Debug, Serialize, Deserialize)]
struct HistoryState {
    session_id: String,
    updated_at: String,
    messages: Vec<Message>,
}

/// Ordered message history for one session.
pub struct ConversationStore {
    store: Arc<dyn KeyValueStore>,
    session_id: SessionId,
    messages: Vec<Message>,
}

impl ConversationStore {
    /// Create a store holding only the seeded welcome message. Nothing is
    /// written until the first append.
    pub fn new(store: Arc<dyn KeyValueStore>, session_id: SessionId, welcome: &str) -> Self {
        Self {
            store,
            session_id,
            messages: vec![Message::bot(welcome)],
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append a message and persist the full history.
    ///
    /// A failed write is logged; the message stays in memory either way.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
        if let Err(e) = self.persist() {
            tracing::warn!(session_id = %self.session_id, error = %e, "failed to persist chat history");
        }
    }

    /// Replace the in-memory history with the persisted one, if any.
    ///
    /// Returns `true` when a history was restored. An unreadable or corrupt
    /// history leaves the seeded welcome message in place.
    pub fn restore(&mut self) -> bool {
        let key = self.session_id.history_key();
        let raw = match self.store.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return false,
            Err(e) => {
                tracing::warn!(session_id = %self.session_id, error = %e, "failed to read chat history");
                return false;
            }
        };

        match serde_json::from_str::<HistoryState>(&raw) {
            Ok(state) => {
                tracing::info!(
                    session_id = %self.session_id,
                    count = state.messages.len(),
                    "restored chat history"
                );
                self.messages = state.messages;
                true
            }
            Err(e) => {
                tracing::warn!(session_id = %self.session_id, error = %e, "ignoring corrupt chat history");
                false
            }
        }
    }

    fn persist(&self) -> anyhow::Result<()> {
        let state = HistoryState {
            session_id: self.session_id.to_string(),
            updated_at: Utc::now().to_rfc3339(),
            messages: self.messages.clone(),
        };
        let content = serde_json::to_string(&state)?;
        self.store.set(&self.session_id.history_key(), &content)?;
        Ok(())
    }
}
