// ABOUTME: Session module — session identity and the persisted conversation history.
// ABOUTME: Both sit on top of an injected KeyValueStore so tests can swap in memory storage.

pub mod history;
pub mod manager;

pub use history::{ConversationStore, Message, Sender};
pub use manager::{SessionId, SessionManager};
