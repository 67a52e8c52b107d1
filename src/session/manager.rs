// ABOUTME: Session manager — reuses the stored session id or mints a fresh one.
// ABOUTME: The id is written to storage exactly once and never changed afterwards.

use std::fmt;

use crate::storage::{KeyValueStore, StorageError};

/// Storage key holding the session identifier.
pub const SESSION_ID_KEY: &str = "session_id";

/// Prefix of the per-session history key.
const HISTORY_KEY_PREFIX: &str = "chat_history_";

/// Opaque per-storage-scope session identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Storage key under which this session's message history lives.
    pub fn history_key(&self) -> String {
        format!("{HISTORY_KEY_PREFIX}{}", self.0)
    }

    /// Short prefix for display in the status bar.
    pub fn short(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(8)
            .map_or(self.0.len(), |(idx, _)| idx);
        &self.0[..end]
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves the session identity for this storage scope.
pub struct SessionManager;

impl SessionManager {
    /// Return the stored session id, creating and persisting one if absent.
    ///
    /// A blank stored value counts as absent. Backend failures propagate.
    pub fn load_or_create(store: &dyn KeyValueStore) -> Result<SessionId, StorageError> {
        if let Some(existing) = store.get(SESSION_ID_KEY)? {
            let existing = existing.trim();
            if !existing.is_empty() {
                tracing::debug!(session_id = %existing, "reusing stored session");
                return Ok(SessionId::new(existing));
            }
        }

        let id = SessionId::generate();
        store.set(SESSION_ID_KEY, id.as_str())?;
        tracing::info!(session_id = %id, "created new session");
        Ok(id)
    }
}
