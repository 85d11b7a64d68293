//! HTTP Error Mapping
//!
//! One taxonomy for every handler: validation problems are 400, token
//! violations are 403, unconfigured payments are 503, upstream failures
//! are 500. Bodies carry only fixed public strings; the operator detail
//! goes to tracing and never to the client.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use gatekit_core::{BrokerError, TokenError};

/// Uniform JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

#[derive(Error, Debug)]
pub enum ApiError {
    /// Bad or missing request data
    #[error("{0}")]
    Validation(String),

    /// Token missing, unknown, expired or already used
    #[error("{0}")]
    Forbidden(&'static str),

    /// Payment flows are disabled because no processor key was configured
    #[error("payments not configured")]
    PaymentsDisabled,

    /// Processor or transport failure; the detail is logged, not returned
    #[error("{detail}")]
    Upstream {
        public: &'static str,
        detail: String,
    },
}

impl ApiError {
    pub fn upstream(public: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Upstream {
            public,
            detail: err.to_string(),
        }
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::PaymentsDisabled => StatusCode::SERVICE_UNAVAILABLE,
            Self::Upstream { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// What the client is allowed to see.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Forbidden(message) => (*message).to_string(),
            Self::PaymentsDisabled => "Payments not configured".to_string(),
            Self::Upstream { public, .. } => (*public).to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Upstream { public, detail } = &self {
            tracing::error!(error = %detail, "{public}");
        }
        (
            self.status_code(),
            Json(ErrorBody {
                error: self.public_message(),
            }),
        )
            .into_response()
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        // unknown and already-used tokens are indistinguishable to callers
        match err {
            TokenError::Expired => Self::Forbidden("Token expired"),
            TokenError::NotFound | TokenError::AlreadyUsed => Self::Forbidden("Forbidden"),
        }
    }
}

impl From<BrokerError> for ApiError {
    fn from(err: BrokerError) -> Self {
        match err {
            BrokerError::Token(token) => token.into(),
            BrokerError::NoSession => Self::Validation("No session information".to_string()),
            BrokerError::Gateway(gateway) => Self::upstream("Server error", gateway),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatekit_core::GatewayError;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ApiError::Validation("Invalid amount".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Forbidden("Forbidden").status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::PaymentsDisabled.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ApiError::upstream("Server error", "boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_token_errors_collapse_to_opaque_messages() {
        let not_found: ApiError = TokenError::NotFound.into();
        let used: ApiError = TokenError::AlreadyUsed.into();
        let expired: ApiError = TokenError::Expired.into();

        assert_eq!(not_found.public_message(), "Forbidden");
        assert_eq!(used.public_message(), "Forbidden");
        assert_eq!(expired.public_message(), "Token expired");
    }

    #[test]
    fn test_upstream_detail_never_reaches_the_body() {
        let err = ApiError::upstream(
            "Failed to retrieve session",
            GatewayError::Processor("stripe said: invalid api key sk_live_abc".into()),
        );

        assert_eq!(err.public_message(), "Failed to retrieve session");
        assert!(!err.public_message().contains("sk_live"));
    }

    #[test]
    fn test_broker_errors_map_through() {
        let no_session: ApiError = BrokerError::NoSession.into();
        assert_eq!(no_session.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(no_session.public_message(), "No session information");

        let gateway: ApiError =
            BrokerError::Gateway(GatewayError::Processor("timeout".into())).into();
        assert_eq!(gateway.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(gateway.public_message(), "Server error");
    }
}
