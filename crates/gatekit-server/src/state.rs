//! Application State

use std::sync::Arc;

use gatekit_core::{ContactIntent, DonationIntent, FlowBroker};
use gatekit_mail::Mailer;

use crate::config::ServerConfig;
use crate::error::ApiError;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,

    /// Donation flow broker (None if Stripe is not configured)
    pub donations: Option<Arc<FlowBroker<DonationIntent>>>,

    /// Contact flow broker (None if Stripe is not configured)
    pub contact: Option<Arc<FlowBroker<ContactIntent>>>,

    /// Outbound mail transport
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn donation_broker(&self) -> Result<&FlowBroker<DonationIntent>, ApiError> {
        self.donations.as_deref().ok_or(ApiError::PaymentsDisabled)
    }

    pub fn contact_broker(&self) -> Result<&FlowBroker<ContactIntent>, ApiError> {
        self.contact.as_deref().ok_or(ApiError::PaymentsDisabled)
    }
}
