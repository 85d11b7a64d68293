//! Error Types

use thiserror::Error;

/// Why a capability token failed validation.
///
/// Callers are expected to collapse these into one opaque forbidden
/// response; the distinction exists for logs and tests, not for clients.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token not found")]
    NotFound,

    #[error("token expired")]
    Expired,

    #[error("token already used")]
    AlreadyUsed,
}

/// Failures talking to the payment processor.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The processor rejected or failed the call (network, API error)
    #[error("payment processor error: {0}")]
    Processor(String),

    /// Session id unknown to or malformed for the processor
    #[error("invalid checkout session id: {0}")]
    InvalidSession(String),

    /// The processor created a session but returned no hosted page URL
    #[error("no checkout URL returned for session {0}")]
    NoCheckoutUrl(String),

    /// The gateway itself is misconfigured (missing secret key)
    #[error("gateway configuration error: {0}")]
    Config(String),
}

/// Failures of a whole flow operation.
#[derive(Error, Debug)]
pub enum BrokerError {
    #[error("{0}")]
    Token(#[from] TokenError),

    #[error("{0}")]
    Gateway(#[from] GatewayError),

    /// Token exists but no checkout session was ever attached to it
    #[error("no session information attached to this token")]
    NoSession,
}
