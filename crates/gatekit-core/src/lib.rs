//! # gatekit-core
//!
//! Capability tokens and the deferred-action broker: payment-gated actions
//! (reveal a donation receipt, send a paid contact message) that run at
//! most once, and only after the processor confirms the checkout session.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     FlowBroker<Intent>                       │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐  │
//! │  │ TokenStore  │  │  Redirect   │  │  CheckoutGateway    │  │
//! │  │ (single use)│──│  Composer   │──│  (Strategy)         │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `CheckoutGateway` trait keeps the processor swappable, and the
//! broker is generic over its flow intent, so donation and contact flows
//! are separate instantiations of the same state machine.

pub mod broker;
pub mod error;
pub mod flow;
pub mod gateway;
pub mod redirect;
pub mod store;
pub mod token;

pub use broker::{CheckoutParams, FlowBroker, FlowStart, PaymentSummary, PollOutcome};
pub use error::{BrokerError, GatewayError, TokenError};
pub use flow::{AttachmentRef, ContactIntent, DonationIntent};
pub use gateway::{
    CheckoutGateway, CheckoutSession, MockGateway, PAID_STATUS, SessionRequest, SessionStatus,
};
pub use redirect::{SESSION_ID_PLACEHOLDER, append_param};
pub use store::{Clock, ManualClock, RandomTokenSource, SystemClock, TokenSource, TokenStore};
pub use token::{TOKEN_TTL_MINUTES, TokenId, TokenRecord};
