// ABOUTME: Gateway error taxonomy — busy, transport, server, and malformed-response failures.
// ABOUTME: The widget collapses all of them into one apology; the variants exist for logging.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// Another request is still in flight.
    #[error("a chat request is already in flight")]
    Busy,
    /// The request never produced an HTTP response.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The server answered with a non-2xx status.
    #[error("server returned HTTP {status}")]
    Server { status: u16 },
    /// The body was not the expected JSON shape.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// Short label used as a structured logging field.
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Busy => "busy",
            GatewayError::Transport(_) => "transport",
            GatewayError::Server { .. } => "server",
            GatewayError::Malformed(_) => "malformed",
        }
    }
}
