// ABOUTME: Request gateway — one chat call at a time, enforced by an in-flight guard.
// ABOUTME: The guard is acquired synchronously by the caller and released on drop, whatever the outcome.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::chat::client::ChatTransport;
use crate::chat::error::GatewayError;
use crate::chat::types::{ChatReply, ChatRequest, FeatureSelections, Language, Outbound};
use crate::session::SessionId;

/// Proof that the holder owns the gateway's single in-flight slot.
///
/// Dropping it clears `is_generating`.
#[derive(Debug)]
pub struct InFlightGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// A request ready to go out, holding the slot it will occupy.
#[derive(Debug)]
pub struct PendingRequest {
    pub guard: InFlightGuard,
    pub outbound: Outbound,
}

/// A finished call whose slot is still held.
///
/// The guard travels with the result so the gateway stays busy until the
/// caller has applied the reply; dropping the completion frees the slot.
#[derive(Debug)]
pub struct Completion {
    pub result: Result<ChatReply, GatewayError>,
    pub guard: InFlightGuard,
}

/// Sends chat requests for one session. Clones share the transport and the
/// in-flight flag.
#[derive(Clone)]
pub struct RequestGateway {
    transport: Arc<dyn ChatTransport>,
    session_id: SessionId,
    in_flight: Arc<AtomicBool>,
}

impl RequestGateway {
    pub fn new(transport: Arc<dyn ChatTransport>, session_id: SessionId) -> Self {
        Self {
            transport,
            session_id,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    /// True strictly while a guard is alive.
    pub fn is_generating(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claim the in-flight slot, or fail with `Busy` if it is taken.
    pub fn begin(&self) -> Result<InFlightGuard, GatewayError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| GatewayError::Busy)?;
        Ok(InFlightGuard {
            flag: Arc::clone(&self.in_flight),
        })
    }

    /// Send free text in the given language.
    pub async fn send_text(
        &self,
        guard: InFlightGuard,
        text: &str,
        language: Language,
    ) -> Result<ChatReply, GatewayError> {
        let request = ChatRequest::text(self.session_id.as_str(), text, language);
        self.call(&guard, request).await
    }

    /// Submit the wizard's collected feature choices.
    pub async fn send_feature_selections(
        &self,
        guard: InFlightGuard,
        selections: &FeatureSelections,
    ) -> Result<ChatReply, GatewayError> {
        let request = ChatRequest::features(self.session_id.as_str(), selections.clone());
        self.call(&guard, request).await
    }

    /// Perform a pending request, handing its guard back with the result.
    pub async fn dispatch(&self, pending: PendingRequest) -> Completion {
        let PendingRequest { guard, outbound } = pending;
        let request = match outbound {
            Outbound::Text { text, language } => {
                ChatRequest::text(self.session_id.as_str(), &text, language)
            }
            Outbound::Features(selections) => {
                ChatRequest::features(self.session_id.as_str(), selections)
            }
        };
        let result = self.call(&guard, request).await;
        Completion { result, guard }
    }

    async fn call(
        &self,
        guard: &InFlightGuard,
        request: ChatRequest,
    ) -> Result<ChatReply, GatewayError> {
        debug_assert!(
            Arc::ptr_eq(&guard.flag, &self.in_flight),
            "guard belongs to a different gateway"
        );

        tracing::debug!(endpoint = self.endpoint(), session_id = %self.session_id, "sending chat request");
        let result = self.transport.post_chat(&request).await;

        match result {
            Ok(raw) => {
                let reply = ChatReply::from(raw);
                tracing::debug!(
                    feature_selection = matches!(reply, ChatReply::FeatureSelection { .. }),
                    "chat request succeeded"
                );
                Ok(reply)
            }
            Err(e) => {
                tracing::warn!(kind = e.kind(), error = %e, "chat request failed");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::testing::MockTransport;
    use crate::chat::types::ChatResponse;

    fn gateway_with(mock: Arc<MockTransport>) -> RequestGateway {
        RequestGateway::new(mock, SessionId::new("sess-1"))
    }

    #[test]
    fn begin_sets_and_drop_clears_flag() {
        let gateway = gateway_with(Arc::new(MockTransport::new()));
        assert!(!gateway.is_generating());

        let guard = gateway.begin().unwrap();
        assert!(gateway.is_generating());

        drop(guard);
        assert!(!gateway.is_generating());
    }

    #[test]
    fn second_begin_is_busy_while_first_alive() {
        let gateway = gateway_with(Arc::new(MockTransport::new()));
        let clone = gateway.clone();

        let _guard = gateway.begin().unwrap();
        assert_eq!(clone.begin().unwrap_err(), GatewayError::Busy);
        assert!(clone.is_generating());
    }

    #[tokio::test]
    async fn send_text_builds_request_and_clears_flag() {
        let mock = Arc::new(MockTransport::new());
        mock.queue_text("Hello there");
        let gateway = gateway_with(mock.clone());

        let guard = gateway.begin().unwrap();
        let reply = gateway.send_text(guard, "hi", Language::Zh).await.unwrap();

        assert_eq!(reply, ChatReply::Text("Hello there".to_string()));
        assert!(!gateway.is_generating());
        assert_eq!(
            mock.recorded_requests(),
            vec![ChatRequest::text("sess-1", "hi", Language::Zh)]
        );
    }

    #[tokio::test]
    async fn send_feature_selections_uses_fixed_query() {
        let mock = Arc::new(MockTransport::new());
        mock.queue_text("Recommended: MSc Computer Science");
        let gateway = gateway_with(mock.clone());

        let selections: FeatureSelections = [("level", "Postgraduate")].into_iter().collect();
        let guard = gateway.begin().unwrap();
        gateway
            .send_feature_selections(guard, &selections)
            .await
            .unwrap();

        let body = serde_json::to_value(&mock.recorded_requests()[0]).unwrap();
        assert_eq!(body["user_query"], "course recommendation");
        assert_eq!(body["session_id"], "sess-1");
        assert_eq!(body["user_features"]["level"], "Postgraduate");
    }

    #[tokio::test]
    async fn failure_is_returned_and_flag_cleared() {
        let mock = Arc::new(MockTransport::new());
        mock.queue_error(GatewayError::Server { status: 500 });
        let gateway = gateway_with(mock);

        let guard = gateway.begin().unwrap();
        let err = gateway
            .send_text(guard, "hi", Language::En)
            .await
            .unwrap_err();

        assert_eq!(err, GatewayError::Server { status: 500 });
        assert!(!gateway.is_generating());
    }

    #[tokio::test]
    async fn dispatch_routes_by_outbound_kind() {
        let mock = Arc::new(MockTransport::new());
        mock.queue_response(ChatResponse {
            response: "Pick one".to_string(),
            feature_selection: Some([("level", vec!["UG", "PG"])].into_iter().collect()),
        });
        let gateway = gateway_with(mock.clone());

        let pending = PendingRequest {
            guard: gateway.begin().unwrap(),
            outbound: Outbound::Text {
                text: "courses?".to_string(),
                language: Language::En,
            },
        };
        let completion = gateway.dispatch(pending).await;

        assert!(matches!(
            completion.result,
            Ok(ChatReply::FeatureSelection { .. })
        ));
        assert!(matches!(
            mock.recorded_requests()[0],
            ChatRequest::Text { .. }
        ));
    }

    #[tokio::test]
    async fn dispatch_holds_slot_until_completion_dropped() {
        let mock = Arc::new(MockTransport::new());
        mock.queue_text("first answer");
        let gateway = gateway_with(mock);

        let pending = PendingRequest {
            guard: gateway.begin().unwrap(),
            outbound: Outbound::Text {
                text: "first".to_string(),
                language: Language::En,
            },
        };
        let completion = gateway.dispatch(pending).await;

        assert!(gateway.is_generating());
        assert_eq!(gateway.begin().unwrap_err(), GatewayError::Busy);
        drop(completion);
        assert!(!gateway.is_generating());
    }

    #[tokio::test]
    async fn guard_released_when_call_is_cancelled() {
        let mock = Arc::new(MockTransport::new());
        mock.hold_responses();
        let gateway = gateway_with(mock);

        let guard = gateway.begin().unwrap();
        let call = gateway.send_text(guard, "hi", Language::En);
        // Dropping the unfinished future drops the guard with it.
        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(20), call).await;
        assert!(timed_out.is_err());
        assert!(!gateway.is_generating());
    }
}
