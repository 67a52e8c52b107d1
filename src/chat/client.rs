// ABOUTME: Chat transport — the seam between the gateway and the network.
// ABOUTME: HttpTransport POSTs JSON to <base_url>/chat with reqwest and classifies failures.

use std::time::Duration;

use async_trait::async_trait;

use crate::chat::error::GatewayError;
use crate::chat::types::{ChatRequest, ChatResponse};

/// Anything that can carry one chat request to the backend.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn post_chat(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError>;

    /// Where requests go, for display and logging.
    fn endpoint(&self) -> &str;
}

/// reqwest-backed transport for the real backend.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Build a transport for `base_url`. `timeout` of `None` leaves requests
    /// unbounded; they resolve only when the connection does.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self {
            client,
            endpoint: chat_endpoint(base_url),
        })
    }
}

/// Join the base URL and the fixed `/chat` path.
pub fn chat_endpoint(base_url: &str) -> String {
    format!("{}/chat", base_url.trim_end_matches('/'))
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn post_chat(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Transport(format!("request timed out: {e}"))
                } else if e.is_connect() {
                    GatewayError::Transport(format!("connection failed: {e}"))
                } else {
                    GatewayError::Transport(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GatewayError::Server {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| GatewayError::Transport(format!("failed to read response: {e}")))?;

        serde_json::from_str(&body).map_err(|e| GatewayError::Malformed(e.to_string()))
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_strips_trailing_slashes() {
        assert_eq!(
            chat_endpoint("http://localhost:8000/"),
            "http://localhost:8000/chat"
        );
        assert_eq!(
            chat_endpoint("http://localhost:8000"),
            "http://localhost:8000/chat"
        );
        assert_eq!(
            chat_endpoint("https://example.edu/api//"),
            "https://example.edu/api/chat"
        );
    }

    #[test]
    fn new_transport_reports_endpoint() {
        let transport = HttpTransport::new("http://127.0.0.1:9", None).unwrap();
        assert_eq!(transport.endpoint(), "http://127.0.0.1:9/chat");
    }
}
