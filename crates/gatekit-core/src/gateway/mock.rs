//! Mock Checkout Gateway
//!
//! For testing and demo purposes. Sessions live in memory and are marked
//! paid from test code instead of by a real payment.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;

use super::{CheckoutGateway, CheckoutSession, PAID_STATUS, SessionRequest, SessionStatus};
use crate::error::GatewayError;

struct MockSession {
    request: SessionRequest,
    paid: bool,
}

/// Mock gateway with scriptable payment outcomes
#[derive(Default)]
pub struct MockGateway {
    sessions: Mutex<HashMap<String, MockSession>>,
    next_id: AtomicU64,
    fail_create: AtomicBool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `create_session` call fail (for testing error paths)
    #[must_use]
    pub fn with_create_failure(self) -> Self {
        self.fail_create.store(true, Ordering::SeqCst);
        self
    }

    /// Flip a session to paid, as the hosted checkout page would
    pub fn mark_paid(&self, session_id: &str) {
        let mut sessions = self.sessions.lock().unwrap();
        if let Some(session) = sessions.get_mut(session_id) {
            session.paid = true;
        }
    }

    /// The request a session was created from, if the session exists
    pub fn request_for(&self, session_id: &str) -> Option<SessionRequest> {
        let sessions = self.sessions.lock().unwrap();
        sessions.get(session_id).map(|s| s.request.clone())
    }

    /// Number of sessions created so far
    pub fn session_count(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }
}

#[async_trait]
impl CheckoutGateway for MockGateway {
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(GatewayError::Processor("mock create failure".to_string()));
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let id = format!("cs_mock_{n:08}");
        let url = format!("https://checkout.mock.local/c/{id}");

        let mut sessions = self.sessions.lock().unwrap();
        sessions.insert(
            id.clone(),
            MockSession {
                request: request.clone(),
                paid: false,
            },
        );

        Ok(CheckoutSession { id, url })
    }

    async fn retrieve_status(&self, session_id: &str) -> Result<SessionStatus, GatewayError> {
        let sessions = self.sessions.lock().unwrap();
        let session = sessions
            .get(session_id)
            .ok_or_else(|| GatewayError::InvalidSession(session_id.to_string()))?;

        Ok(SessionStatus {
            paid: session.paid,
            status: if session.paid {
                PAID_STATUS.to_string()
            } else {
                "unpaid".to_string()
            },
            amount_total: Some(session.request.amount_minor),
            currency: Some(session.request.currency.clone()),
        })
    }

    fn name(&self) -> &str {
        "MockCheckout"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SessionRequest {
        SessionRequest {
            amount_minor: 1000,
            currency: "eur".to_string(),
            success_url: "https://x/s".to_string(),
            cancel_url: "https://x/c".to_string(),
            description: "Donation".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_session_lifecycle() {
        let gateway = MockGateway::new();

        let session = gateway.create_session(&request()).await.unwrap();
        assert!(session.url.contains(&session.id));

        let status = gateway.retrieve_status(&session.id).await.unwrap();
        assert!(!status.paid);
        assert_eq!(status.status, "unpaid");
        assert_eq!(status.amount_total, Some(1000));

        gateway.mark_paid(&session.id);
        let status = gateway.retrieve_status(&session.id).await.unwrap();
        assert!(status.paid);
        assert_eq!(status.status, PAID_STATUS);
    }

    #[tokio::test]
    async fn test_unknown_session_is_an_error() {
        let gateway = MockGateway::new();
        let result = gateway.retrieve_status("cs_missing").await;
        assert!(matches!(result, Err(GatewayError::InvalidSession(_))));
    }

    #[tokio::test]
    async fn test_scripted_create_failure() {
        let gateway = MockGateway::new().with_create_failure();
        let result = gateway.create_session(&request()).await;
        assert!(matches!(result, Err(GatewayError::Processor(_))));
        assert_eq!(gateway.session_count(), 0);
    }
}
