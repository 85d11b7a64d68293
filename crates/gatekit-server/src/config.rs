//! Server Configuration
//!
//! Everything comes from the environment with workable defaults. The one
//! value without a default is the Stripe secret key; its absence disables
//! the payment flows loudly at startup instead of failing requests
//! half-way through.

use std::path::PathBuf;

use gatekit_mail::SmtpSettings;

/// Contact-flow pricing and gating.
#[derive(Clone, Debug)]
pub struct ContactPolicy {
    /// Fee in minor units; zero or negative means the flow is free
    pub fee_cents: i64,
    pub currency: String,
    /// Master switch; without it the fee is ignored entirely
    pub require_payment: bool,
}

impl ContactPolicy {
    /// Whether a submission must pass through the payment broker.
    pub const fn payment_gated(&self) -> bool {
        self.require_payment && self.fee_cents > 0
    }
}

/// Full server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// External origin used to build default redirect URLs
    pub public_base_url: String,
    pub static_dir: PathBuf,
    pub uploads_dir: PathBuf,
    pub mail_from: String,
    pub mail_to: String,
    /// Remove uploaded attachments once the mail went out
    pub delete_uploads_after_send: bool,
    /// None means no SMTP host configured; mail falls back to a file spool
    pub smtp: Option<SmtpSettings>,
    pub contact: ContactPolicy,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        let smtp = match (
            std::env::var("SMTP_HOST").ok(),
            std::env::var("SMTP_USER").ok(),
            std::env::var("SMTP_PASS").ok(),
        ) {
            (Some(host), Some(user), Some(pass)) => Some(SmtpSettings {
                host,
                port: env_parse("SMTP_PORT", 587),
                user,
                pass,
                secure: parse_flag(std::env::var("SMTP_SECURE").ok().as_deref(), false),
            }),
            _ => None,
        };

        Self {
            bind_addr: env_or("BIND_ADDR", "0.0.0.0:4000"),
            public_base_url: env_or("PUBLIC_BASE_URL", "http://localhost:4000"),
            static_dir: env_or("STATIC_DIR", "static").into(),
            uploads_dir: env_or("UPLOADS_DIR", "uploads").into(),
            mail_from: env_or("MAIL_FROM", "Website Contact <contact@example.org>"),
            mail_to: env_or("MAIL_TO", "contact@example.org"),
            delete_uploads_after_send: parse_flag(
                std::env::var("MAIL_DELETE_UPLOADS").ok().as_deref(),
                true,
            ),
            smtp,
            contact: ContactPolicy {
                fee_cents: env_parse("CONTACT_FEE_CENTS", 0),
                currency: env_or("CONTACT_FEE_CURRENCY", "eur"),
                require_payment: parse_flag(
                    std::env::var("CONTACT_REQUIRE_PAYMENT").ok().as_deref(),
                    false,
                ),
            },
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Boolean env convention: unset means `default`, and only the explicit
/// negatives ("false", "0", "no", empty) turn a set variable off.
fn parse_flag(value: Option<&str>, default: bool) -> bool {
    value.map_or(default, |v| {
        !matches!(v.to_ascii_lowercase().as_str(), "false" | "0" | "no" | "")
    })
}
