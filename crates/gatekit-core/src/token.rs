//! Capability Tokens
//!
//! Single-use, time-limited tokens that gate deferred actions behind a
//! confirmed payment. A token is minted when a checkout flow starts and
//! consumed exactly once when its gated action runs.

use chrono::{DateTime, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Validity window of a capability token, in minutes from issuance.
pub const TOKEN_TTL_MINUTES: i64 = 15;

/// Opaque capability token identifier: 128 bits of OS entropy, hex encoded.
///
/// The id space is large enough that collisions are not checked for.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(String);

impl TokenId {
    /// Mint a fresh id from the OS random source.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 16];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self(hex::encode(bytes))
    }

    /// Wrap a client-supplied value, e.g. a `token` query parameter.
    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State tracked per issued token.
///
/// `intent` is the flow-owned payload needed to complete the deferred
/// action once payment is confirmed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenRecord<I> {
    pub id: TokenId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    /// Checkout session bound to this token once the gateway confirms creation
    pub session_id: Option<String>,
    pub intent: I,
}

impl<I> TokenRecord<I> {
    /// A record stops being consumable the instant `expires_at` is reached.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_generated_ids_are_hex_and_unique() {
        let a = TokenId::generate();
        let b = TokenId::generate();

        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_display_matches_as_str() {
        let id = TokenId::from_string("abc123");
        assert_eq!(id.to_string(), "abc123");
        assert_eq!(id.as_str(), "abc123");
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let now = Utc::now();
        let record = TokenRecord {
            id: TokenId::generate(),
            created_at: now,
            expires_at: now + Duration::minutes(15),
            used: false,
            session_id: None,
            intent: (),
        };

        assert!(!record.is_expired_at(now));
        assert!(!record.is_expired_at(now + Duration::minutes(14)));
        assert!(record.is_expired_at(now + Duration::minutes(15)));
        assert!(record.is_expired_at(now + Duration::minutes(16)));
    }
}
