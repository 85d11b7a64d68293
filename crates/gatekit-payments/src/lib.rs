//! # gatekit-payments
//!
//! Stripe implementation of the checkout gateway.
//!
//! ## Integration Approach
//!
//! This crate uses "Stripe Checkout (Hosted)" exclusively: the backend
//! creates a session, the client is redirected to Stripe's hosted page,
//! and Stripe redirects back to our token-guarded success and cancel
//! pages.
//!
//! ```text
//! ┌─────────────┐     ┌─────────────────┐     ┌──────────────────┐
//! │  Your Site  │────▶│  Stripe Hosted  │────▶│  Your Site       │
//! │  (donate)   │     │  Checkout Page  │     │  (?token=...)    │
//! └─────────────┘     └─────────────────┘     └──────────────────┘
//! ```
//!
//! Settlement is observed by polling session status from the success
//! page, never via webhooks, so the server needs no publicly reachable
//! callback URL and no webhook signing secret.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gatekit_payments::StripeGateway;
//! use gatekit_core::{FlowBroker, DonationIntent};
//!
//! let gateway = std::sync::Arc::new(StripeGateway::from_env()?);
//! let broker = FlowBroker::<DonationIntent>::new("donation", gateway);
//! ```

mod amount;
mod checkout;

pub use amount::to_minor_units;
pub use checkout::StripeGateway;
