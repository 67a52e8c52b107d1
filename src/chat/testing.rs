// ABOUTME: Mock chat transport for tests — returns queued responses and records requests.
// ABOUTME: Can hold responses behind a gate so tests can observe a request while it is in flight.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::chat::client::ChatTransport;
use crate::chat::error::GatewayError;
use crate::chat::types::{ChatRequest, ChatResponse};

// A test that panicked mid-call leaves the queues usable.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Transport that replays queued results in order.
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<ChatResponse, GatewayError>>>,
    requests: Mutex<Vec<ChatRequest>>,
    held: AtomicBool,
    gate: Semaphore,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            held: AtomicBool::new(false),
            gate: Semaphore::new(0),
        }
    }

    /// Queue a raw response.
    pub fn queue_response(&self, response: ChatResponse) {
        lock(&self.responses).push_back(Ok(response));
    }

    /// Queue a plain-text reply.
    pub fn queue_text(&self, text: &str) {
        self.queue_response(ChatResponse {
            response: text.to_string(),
            feature_selection: None,
        });
    }

    /// Queue a failure.
    pub fn queue_error(&self, error: GatewayError) {
        lock(&self.responses).push_back(Err(error));
    }

    /// Make every subsequent call wait until `release_one` is called.
    pub fn hold_responses(&self) {
        self.held.store(true, Ordering::SeqCst);
    }

    /// Let one held call proceed.
    pub fn release_one(&self) {
        self.gate.add_permits(1);
    }

    /// Requests seen so far, in call order.
    pub fn recorded_requests(&self) -> Vec<ChatRequest> {
        lock(&self.requests).clone()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn post_chat(&self, request: &ChatRequest) -> Result<ChatResponse, GatewayError> {
        lock(&self.requests).push(request.clone());

        if self.held.load(Ordering::SeqCst) {
            let permit = self
                .gate
                .acquire()
                .await
                .map_err(|e| GatewayError::Transport(e.to_string()))?;
            permit.forget();
        }

        lock(&self.responses)
            .pop_front()
            .unwrap_or_else(|| Err(GatewayError::Transport("no mock response queued".to_string())))
    }

    fn endpoint(&self) -> &str {
        "mock://chat"
    }
}
