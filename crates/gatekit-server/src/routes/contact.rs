//! Contact Flow
//!
//! POST /mail           direct send, used while the contact fee is off
//! POST /mail/checkout  payment-gated submission
//! GET  /mail/fee       public pricing info for the form
//! GET  /mail/success   redirect landing page, token-guarded, reloadable
//! GET  /mail/info      payment status poll; sends the stored mail once paid
//! GET  /mail/cancel    cancel landing page; first view consumes the token
//!
//! A gated submission is parsed and stored inside the capability token's
//! intent. Nothing touches the mail transport until `/mail/info` observes
//! a settled payment and consumes the token.

use axum::Json;
use axum::extract::{Multipart, Query, State};
use axum::response::Html;
use serde::Serialize;

use gatekit_core::{AttachmentRef, BrokerError, CheckoutParams, ContactIntent, PaymentSummary, PollOutcome};
use gatekit_mail::{ContactAddressing, render_contact};

use super::upload::save_upload;
use super::{FlowStartResponse, TokenQuery};
use crate::error::ApiError;
use crate::state::AppState;

const SUCCESS_PAGE: &str = include_str!("../../pages/contact-success.html");
const CANCEL_PAGE: &str = include_str!("../../pages/contact-cancel.html");

/// Parsed multipart contact submission.
#[derive(Debug, Default)]
struct ContactForm {
    intent: ContactIntent,
    success_url: Option<String>,
    cancel_url: Option<String>,
    /// Files posted straight with the form instead of via the upload route
    direct_uploads: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub ok: bool,
    pub message_id: String,
    /// Spool location for dev transports, null in production
    pub preview_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum CheckoutResponse {
    Flow(FlowStartResponse),
    Sent(SendResponse),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactCompleted {
    pub ok: bool,
    pub message_id: String,
    pub preview_url: Option<String>,
    #[serde(flatten)]
    pub summary: PaymentSummary,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ContactInfoResponse {
    Pending { paid: bool, status: String },
    Sent(ContactCompleted),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeResponse {
    pub fee_cents: i64,
    pub currency: String,
}

fn some_nonempty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

async fn parse_contact_form(
    state: &AppState,
    mut multipart: Multipart,
) -> Result<ContactForm, ApiError> {
    let mut form = ContactForm::default();
    let mut uploaded_filename = None;
    let mut uploaded_original_name = None;
    let mut direct_refs = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Malformed form data: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(file_name) = field.file_name().map(str::to_string) {
            // tolerated, but the two-step upload route is the intended path
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("Malformed form data: {e}")))?;
            let saved = save_upload(&state.config.uploads_dir, &name, &file_name, &data).await?;
            tracing::warn!(
                field = %name,
                stored = %saved.filename,
                "file posted directly with the contact form"
            );
            direct_refs.push(AttachmentRef {
                stored_name: saved.filename,
                display_name: file_name,
            });
            form.direct_uploads += 1;
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::Validation(format!("Malformed form data: {e}")))?;
        match name.as_str() {
            "name" => form.intent.name = some_nonempty(value),
            "email" => form.intent.email = some_nonempty(value),
            "subject" => form.intent.subject = some_nonempty(value),
            "message" => form.intent.message = some_nonempty(value),
            "uploadedFilename" => uploaded_filename = some_nonempty(value),
            "uploadedOriginalName" => uploaded_original_name = some_nonempty(value),
            "success_url" => form.success_url = some_nonempty(value),
            "cancel_url" => form.cancel_url = some_nonempty(value),
            _ => {}
        }
    }

    if let Some(stored_name) = uploaded_filename {
        let display_name = uploaded_original_name.unwrap_or_else(|| stored_name.clone());
        form.intent.attachments.push(AttachmentRef {
            stored_name,
            display_name,
        });
    }
    form.intent.attachments.extend(direct_refs);

    Ok(form)
}

fn direct_upload_warning(count: usize) -> Option<String> {
    (count > 0).then(|| {
        "A file was posted directly with the form and has been attached; \
         prefer uploading it via /upload/document first."
            .to_string()
    })
}

/// Render the stored intent, send it, then clean up attachments.
///
/// Attachment files are only removed after the transport reported
/// success, so a failed send keeps them available for the retry.
async fn deliver(
    state: &AppState,
    intent: &ContactIntent,
    warning: Option<String>,
) -> Result<SendResponse, ApiError> {
    let addressing = ContactAddressing {
        from: state.config.mail_from.clone(),
        to: state.config.mail_to.clone(),
    };
    let (mail, attached_paths) =
        render_contact(intent, &addressing, &state.config.uploads_dir).await;

    let receipt = state
        .mailer
        .send(&mail)
        .await
        .map_err(|e| ApiError::upstream("Failed to send email", e))?;

    tracing::info!(
        message_id = %receipt.message_id,
        transport = state.mailer.name(),
        attachments = attached_paths.len(),
        "contact mail sent"
    );

    if state.config.delete_uploads_after_send {
        for path in &attached_paths {
            match tokio::fs::remove_file(path).await {
                Ok(()) => tracing::debug!(path = %path.display(), "deleted sent attachment"),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "failed to delete sent attachment");
                }
            }
        }
    }

    Ok(SendResponse {
        ok: true,
        message_id: receipt.message_id,
        preview_url: receipt.preview_url,
        warning,
    })
}

/// Direct contact send, bypassing payment entirely
pub async fn contact_send(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<SendResponse>, ApiError> {
    let form = parse_contact_form(&state, multipart).await?;
    let warning = direct_upload_warning(form.direct_uploads);
    deliver(&state, &form.intent, warning).await.map(Json)
}

/// Payment-gated contact submission.
///
/// Starts a checkout flow when the fee applies; falls back to an
/// immediate send whenever payment is switched off, so the frontend can
/// post here unconditionally.
pub async fn contact_checkout(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let form = parse_contact_form(&state, multipart).await?;

    if !state.config.contact.payment_gated() {
        let warning = direct_upload_warning(form.direct_uploads);
        let sent = deliver(&state, &form.intent, warning).await?;
        return Ok(Json(CheckoutResponse::Sent(sent)));
    }

    let broker = state.contact_broker()?;
    let base = &state.config.public_base_url;
    let params = CheckoutParams {
        amount_minor: state.config.contact.fee_cents,
        currency: state.config.contact.currency.clone(),
        success_url: form
            .success_url
            .unwrap_or_else(|| format!("{base}/mail/success")),
        cancel_url: form
            .cancel_url
            .unwrap_or_else(|| format!("{base}/mail/cancel")),
        description: "Contact message fee".to_string(),
    };

    let start = broker
        .start(form.intent, params)
        .await
        .map_err(|e| ApiError::upstream("Server error", e))?;

    Ok(Json(CheckoutResponse::Flow(start.into())))
}

/// Public pricing info for the contact form
pub async fn contact_fee(State(state): State<AppState>) -> Json<FeeResponse> {
    Json(FeeResponse {
        fee_cents: state.config.contact.fee_cents,
        currency: state.config.contact.currency.clone(),
    })
}

/// Success redirect target; the embedded script polls `/mail/info`
pub async fn contact_success(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Html<&'static str>, ApiError> {
    let token = query.require()?;
    state.contact_broker()?.authorize_view(&token)?;
    Ok(Html(SUCCESS_PAGE))
}

/// Deferred completion: the stored message goes out on the poll that
/// first observes the settled payment
pub async fn contact_info(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<ContactInfoResponse>, ApiError> {
    let token = query.require()?;

    let outcome = state
        .contact_broker()?
        .poll(&token)
        .await
        .map_err(|e| match e {
            BrokerError::Gateway(gateway) => {
                ApiError::upstream("Failed to retrieve session", gateway)
            }
            other => other.into(),
        })?;

    match outcome {
        PollOutcome::Pending { status } => Ok(Json(ContactInfoResponse::Pending {
            paid: false,
            status,
        })),
        PollOutcome::Completed { summary, intent } => {
            // the consume above already spent the token; a failed send
            // here is a 500 and the client must resubmit
            let sent = deliver(&state, &intent, None).await?;
            Ok(Json(ContactInfoResponse::Sent(ContactCompleted {
                ok: sent.ok,
                message_id: sent.message_id,
                preview_url: sent.preview_url,
                summary,
            })))
        }
    }
}

/// Cancel redirect target; the first view consumes the token
pub async fn contact_cancel(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Html<&'static str>, ApiError> {
    let token = query.require()?;
    state.contact_broker()?.cancel(&token)?;
    Ok(Html(CANCEL_PAGE))
}
