//! Stripe Checkout Integration
//!
//! Implements the "Stripe Checkout (Hosted)" approach: one-off `payment`
//! mode sessions whose redirect URLs already carry the capability token.

use std::str::FromStr;

use async_trait::async_trait;
use stripe::{
    CheckoutSession as StripeCheckoutSession, CheckoutSessionId, CheckoutSessionMode,
    CheckoutSessionPaymentStatus, Client, CreateCheckoutSession, CreateCheckoutSessionLineItems,
    CreateCheckoutSessionLineItemsPriceData, CreateCheckoutSessionLineItemsPriceDataProductData,
    CreateCheckoutSessionPaymentMethodTypes, Currency,
};

use gatekit_core::{CheckoutGateway, CheckoutSession, GatewayError, SessionRequest, SessionStatus};

/// Stripe-backed checkout gateway
pub struct StripeGateway {
    client: Client,
}

impl StripeGateway {
    /// Create a gateway from a secret API key
    pub fn new(secret_key: &str) -> Self {
        Self {
            client: Client::new(secret_key),
        }
    }

    /// Create from the `STRIPE_SECRET_KEY` environment variable
    pub fn from_env() -> Result<Self, GatewayError> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY")
            .map_err(|_| GatewayError::Config("STRIPE_SECRET_KEY not set".into()))?;
        Ok(Self::new(&secret_key))
    }
}

#[async_trait]
impl CheckoutGateway for StripeGateway {
    async fn create_session(
        &self,
        request: &SessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let currency = Currency::from_str(&request.currency).map_err(|_| {
            GatewayError::Processor(format!("unsupported currency: {}", request.currency))
        })?;

        let mut params = CreateCheckoutSession::new();
        params.mode = Some(CheckoutSessionMode::Payment);
        params.payment_method_types = Some(vec![CreateCheckoutSessionPaymentMethodTypes::Card]);
        params.success_url = Some(&request.success_url);
        params.cancel_url = Some(&request.cancel_url);
        params.line_items = Some(vec![CreateCheckoutSessionLineItems {
            quantity: Some(1),
            price_data: Some(CreateCheckoutSessionLineItemsPriceData {
                currency,
                unit_amount: Some(request.amount_minor),
                product_data: Some(CreateCheckoutSessionLineItemsPriceDataProductData {
                    name: request.description.clone(),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }]);

        let session = StripeCheckoutSession::create(&self.client, params)
            .await
            .map_err(|e| GatewayError::Processor(e.to_string()))?;

        let url = session
            .url
            .ok_or_else(|| GatewayError::NoCheckoutUrl(session.id.to_string()))?;

        tracing::debug!(session_id = %session.id, "stripe checkout session created");

        Ok(CheckoutSession {
            id: session.id.to_string(),
            url,
        })
    }

    async fn retrieve_status(&self, session_id: &str) -> Result<SessionStatus, GatewayError> {
        let id = CheckoutSessionId::from_str(session_id)
            .map_err(|_| GatewayError::InvalidSession(session_id.to_string()))?;

        let session = StripeCheckoutSession::retrieve(&self.client, &id, &[])
            .await
            .map_err(|e| GatewayError::Processor(e.to_string()))?;

        Ok(SessionStatus {
            paid: matches!(
                session.payment_status,
                CheckoutSessionPaymentStatus::Paid
            ),
            status: session.payment_status.as_str().to_string(),
            amount_total: session.amount_total,
            currency: session.currency.map(|c| c.to_string()),
        })
    }

    fn name(&self) -> &str {
        "Stripe"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_name() {
        let gateway = StripeGateway::new("sk_test_123");
        assert_eq!(gateway.name(), "Stripe");
    }

    #[tokio::test]
    async fn test_malformed_session_id_is_invalid_session() {
        let gateway = StripeGateway::new("sk_test_123");
        let result = gateway.retrieve_status("not-a-session-id").await;
        assert!(matches!(result, Err(GatewayError::InvalidSession(_))));
    }
}
