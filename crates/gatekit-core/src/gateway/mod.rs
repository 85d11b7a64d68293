//! Checkout Gateway
//!
//! Abstraction over the payment processor's hosted-checkout API.

mod mock;

pub use mock::MockGateway;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// The processor's sentinel for a settled payment.
pub const PAID_STATUS: &str = "paid";

/// Parameters for creating a hosted checkout session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionRequest {
    /// Amount in minor currency units (cents); callers validate it is positive
    pub amount_minor: i64,
    /// Lowercase ISO currency code, e.g. "eur"
    pub currency: String,
    /// Redirect target after payment, token and placeholder already appended
    pub success_url: String,
    /// Redirect target after cancellation, token already appended
    pub cancel_url: String,
    /// Line-item description shown on the hosted page
    pub description: String,
}

/// A freshly created checkout session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Opaque processor session id
    pub id: String,
    /// Hosted checkout page to send the client to
    pub url: String,
}

/// Payment status of an existing session.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionStatus {
    /// True iff the processor reports its paid sentinel
    pub paid: bool,
    /// Raw processor status string, for diagnostics and pending responses
    pub status: String,
    /// Total in minor units, when the processor reports one
    pub amount_total: Option<i64>,
    /// Session currency, when the processor reports one
    pub currency: Option<String>,
}

/// Payment processor trait (Strategy pattern)
///
/// Implement this per processor. "Could not check" must surface as a
/// `GatewayError`; "checked and not settled" is an `Ok` status with
/// `paid == false`.
#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Create a hosted checkout session
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<CheckoutSession, GatewayError>;

    /// Look up the payment status of a session
    async fn retrieve_status(&self, session_id: &str) -> Result<SessionStatus, GatewayError>;

    /// Processor name, for logs
    fn name(&self) -> &str;
}
