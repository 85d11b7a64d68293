//! Deferred Action Broker
//!
//! Orchestrates one payment-gated flow: issues capability tokens, binds
//! them to checkout sessions, guards the redirect pages and runs the
//! validate, poll, consume cycle that authorizes the gated action.

use std::sync::Arc;

use serde::Serialize;

use crate::error::{BrokerError, TokenError};
use crate::gateway::{CheckoutGateway, SessionRequest, SessionStatus};
use crate::redirect::{SESSION_ID_PLACEHOLDER, append_param};
use crate::store::TokenStore;
use crate::token::TokenId;

/// Checkout parameters for starting a flow.
#[derive(Clone, Debug)]
pub struct CheckoutParams {
    pub amount_minor: i64,
    pub currency: String,
    pub success_url: String,
    pub cancel_url: String,
    pub description: String,
}

/// Everything the client needs to reach the hosted checkout page.
#[derive(Clone, Debug)]
pub struct FlowStart {
    pub token: TokenId,
    pub session_id: String,
    pub checkout_url: String,
}

/// Client-facing summary of a settled payment. Never exposes raw
/// processor objects, only these four derived fields.
#[derive(Clone, Debug, Serialize)]
pub struct PaymentSummary {
    /// Major-unit amount with two decimals, e.g. "10.00"
    pub amount: Option<String>,
    /// Uppercased currency code, empty when the processor omits it
    pub currency: String,
    /// Raw processor payment status
    pub status: String,
    /// Shortened session reference, safe to show to the payer
    pub reference: String,
}

impl PaymentSummary {
    fn new(session_id: &str, status: &SessionStatus) -> Self {
        Self {
            amount: status.amount_total.map(format_major_units),
            currency: status
                .currency
                .as_deref()
                .map(str::to_uppercase)
                .unwrap_or_default(),
            status: status.status.clone(),
            reference: short_reference(session_id),
        }
    }
}

/// Outcome of polling a token's payment status.
#[derive(Clone, Debug)]
pub enum PollOutcome<I> {
    /// Not settled yet. The token is untouched and may be polled again.
    Pending { status: String },
    /// Paid, and the token is now consumed: the caller must perform the
    /// gated action with `intent` right away, there is no second chance.
    Completed { summary: PaymentSummary, intent: I },
}

/// Broker for one flow kind. Donation and contact flows are separate
/// instances, so their tokens live in disjoint namespaces.
pub struct FlowBroker<I> {
    flow: &'static str,
    store: TokenStore<I>,
    gateway: Arc<dyn CheckoutGateway>,
}

impl<I: Clone + Send + Sync> FlowBroker<I> {
    pub fn new(flow: &'static str, gateway: Arc<dyn CheckoutGateway>) -> Self {
        Self {
            flow,
            store: TokenStore::new(),
            gateway,
        }
    }

    /// Build around a pre-configured store (injected clock or id source).
    pub fn with_store(
        flow: &'static str,
        store: TokenStore<I>,
        gateway: Arc<dyn CheckoutGateway>,
    ) -> Self {
        Self {
            flow,
            store,
            gateway,
        }
    }

    /// Start a flow: issue a token, create the checkout session, bind them.
    ///
    /// The token rides along on both redirect URLs; the success URL also
    /// gets the processor's session id placeholder. If session creation
    /// fails the freshly issued token is left behind for the sweeper and
    /// the caller never sees it.
    pub async fn start(&self, intent: I, params: CheckoutParams) -> Result<FlowStart, BrokerError> {
        let token = self.store.issue(intent);

        let success_url = append_param(&params.success_url, "token", token.as_str());
        let success_url = append_param(&success_url, "session_id", SESSION_ID_PLACEHOLDER);
        let cancel_url = append_param(&params.cancel_url, "token", token.as_str());

        let request = SessionRequest {
            amount_minor: params.amount_minor,
            currency: params.currency,
            success_url,
            cancel_url,
            description: params.description,
        };

        let session = self.gateway.create_session(&request).await?;
        self.store.attach_session(&token, &session.id)?;

        tracing::info!(
            flow = self.flow,
            session_id = %session.id,
            gateway = self.gateway.name(),
            "checkout session created"
        );

        Ok(FlowStart {
            token,
            session_id: session.id,
            checkout_url: session.url,
        })
    }

    /// Guard for the success page.
    ///
    /// The page itself is idempotently viewable, so an already consumed
    /// token still passes; only unknown and expired tokens are turned
    /// away. Consumption happens in `poll`, never here.
    pub fn authorize_view(&self, token: &TokenId) -> Result<(), TokenError> {
        match self.store.validate(token) {
            Ok(_) | Err(TokenError::AlreadyUsed) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Poll the payment status behind a token, consuming it on success.
    ///
    /// The atomic consume is the sole authorization for the gated action:
    /// of two racing polls on a paid session, exactly one observes
    /// `Completed` and the other gets `AlreadyUsed`. An unpaid session
    /// leaves the token untouched.
    pub async fn poll(&self, token: &TokenId) -> Result<PollOutcome<I>, BrokerError> {
        let record = self.store.validate(token)?;
        let session_id = record.session_id.ok_or(BrokerError::NoSession)?;

        let status = self.gateway.retrieve_status(&session_id).await?;
        if !status.paid {
            return Ok(PollOutcome::Pending {
                status: status.status,
            });
        }

        let record = self.store.consume(token)?;
        tracing::info!(
            flow = self.flow,
            session_id = %session_id,
            "payment confirmed, token consumed"
        );

        Ok(PollOutcome::Completed {
            summary: PaymentSummary::new(&session_id, &status),
            intent: record.intent,
        })
    }

    /// Serve-once cancel: consumes the token so revisits are rejected.
    pub fn cancel(&self, token: &TokenId) -> Result<(), TokenError> {
        self.store.consume(token)?;
        tracing::debug!(flow = self.flow, "flow cancelled, token consumed");
        Ok(())
    }

    /// Drop used and expired tokens. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        self.store.sweep()
    }
}

fn format_major_units(minor: i64) -> String {
    format!("{}.{:02}", minor / 100, (minor % 100).abs())
}

/// First eight and last four characters of the session id; short ids
/// pass through whole.
fn short_reference(session_id: &str) -> String {
    if session_id.len() > 12 {
        format!(
            "{}...{}",
            &session_id[..8],
            &session_id[session_id.len() - 4..]
        )
    } else {
        session_id.to_string()
    }
}
