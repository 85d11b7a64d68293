//! Donation Flow
//!
//! POST /donate          create a checkout session and capability token
//! GET  /donate/success  redirect landing page, token-guarded, reloadable
//! GET  /donate/info     payment status poll; consumes the token once paid
//! GET  /donate/cancel   cancel landing page; first view consumes the token

use axum::Json;
use axum::extract::{Query, State};
use axum::response::Html;
use serde::{Deserialize, Serialize};

use gatekit_core::{BrokerError, CheckoutParams, DonationIntent, PaymentSummary, PollOutcome};
use gatekit_payments::to_minor_units;

use super::{FlowStartResponse, TokenQuery};
use crate::error::ApiError;
use crate::state::AppState;

const SUCCESS_PAGE: &str = include_str!("../../pages/donate-success.html");
const CANCEL_PAGE: &str = include_str!("../../pages/donate-cancel.html");

#[derive(Debug, Deserialize)]
pub struct DonationRequest {
    /// Major currency units: 10 means ten euro
    pub amount: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub success_url: Option<String>,
    #[serde(default)]
    pub cancel_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DonationInfoResponse {
    Pending { paid: bool, status: String },
    Paid(PaymentSummary),
}

/// Create a checkout session for a donation
pub async fn donation_start(
    State(state): State<AppState>,
    Json(payload): Json<DonationRequest>,
) -> Result<Json<FlowStartResponse>, ApiError> {
    let broker = state.donation_broker()?;

    let Some(amount) = payload.amount else {
        return Err(ApiError::Validation(
            "Missing amount (in major currency units, e.g. 10 for €10)".to_string(),
        ));
    };
    let (success_url, cancel_url) = match (payload.success_url, payload.cancel_url) {
        (Some(s), Some(c)) if !s.is_empty() && !c.is_empty() => (s, c),
        _ => {
            return Err(ApiError::Validation(
                "Missing success_url or cancel_url".to_string(),
            ));
        }
    };
    let amount_minor =
        to_minor_units(amount).ok_or_else(|| ApiError::Validation("Invalid amount".to_string()))?;

    let params = CheckoutParams {
        amount_minor,
        currency: payload.currency.unwrap_or_else(|| "eur".to_string()),
        success_url,
        cancel_url,
        description: "Donation".to_string(),
    };

    let start = broker
        .start(DonationIntent, params)
        .await
        .map_err(|e| ApiError::upstream("Server error", e))?;

    Ok(Json(start.into()))
}

/// Success redirect target; the embedded script polls `/donate/info`
pub async fn donation_success(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Html<&'static str>, ApiError> {
    let token = query.require()?;
    state.donation_broker()?.authorize_view(&token)?;
    Ok(Html(SUCCESS_PAGE))
}

/// Payment status poll; reveals the receipt and consumes the token when paid
pub async fn donation_info(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<DonationInfoResponse>, ApiError> {
    let token = query.require()?;

    let outcome = state
        .donation_broker()?
        .poll(&token)
        .await
        .map_err(|e| match e {
            BrokerError::Gateway(gateway) => {
                ApiError::upstream("Failed to retrieve session", gateway)
            }
            other => other.into(),
        })?;

    Ok(Json(match outcome {
        PollOutcome::Pending { status } => DonationInfoResponse::Pending {
            paid: false,
            status,
        },
        PollOutcome::Completed { summary, .. } => DonationInfoResponse::Paid(summary),
    }))
}

/// Cancel redirect target; the first view consumes the token
pub async fn donation_cancel(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Html<&'static str>, ApiError> {
    let token = query.require()?;
    state.donation_broker()?.cancel(&token)?;
    Ok(Html(CANCEL_PAGE))
}
