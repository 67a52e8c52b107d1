// ABOUTME: Chat module — wire types, the HTTP transport, the single-flight gateway, and the chat loop.
// ABOUTME: Everything that talks to the /chat endpoint lives here.

pub mod client;
pub mod error;
pub mod gateway;
pub mod r#loop;
pub mod testing;
pub mod types;

pub use client::{ChatTransport, HttpTransport};
pub use error::GatewayError;
pub use gateway::{Completion, InFlightGuard, PendingRequest, RequestGateway};
pub use r#loop::run_chat_loop;
pub use types::*;
