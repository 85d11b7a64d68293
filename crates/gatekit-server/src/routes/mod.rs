//! Route Handlers
//!
//! One module per flow, plus the shared wire types both flows speak.

pub mod contact;
pub mod donation;
pub mod upload;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use gatekit_core::{FlowStart, TokenId};

use crate::error::ApiError;
use crate::state::AppState;

/// `{url, id, token}` returned whenever a payment flow starts.
#[derive(Debug, Serialize)]
pub struct FlowStartResponse {
    /// Hosted checkout page to redirect the client to
    pub url: String,
    /// Checkout session id
    pub id: String,
    /// Capability token; rides back on the redirect URLs too
    pub token: String,
}

impl From<FlowStart> for FlowStartResponse {
    fn from(start: FlowStart) -> Self {
        Self {
            url: start.checkout_url,
            id: start.session_id,
            token: start.token.as_str().to_string(),
        }
    }
}

/// Query string carrying the capability token.
#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: Option<String>,
}

impl TokenQuery {
    /// Present and non-empty, or the same opaque response an unknown
    /// token would get.
    pub fn require(&self) -> Result<TokenId, ApiError> {
        match self.token.as_deref() {
            Some(value) if !value.is_empty() => Ok(TokenId::from_string(value)),
            _ => Err(ApiError::Forbidden("Forbidden")),
        }
    }
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub stripe_configured: bool,
    pub smtp_configured: bool,
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        stripe_configured: state.donations.is_some(),
        smtp_configured: state.config.smtp.is_some(),
    })
}
