//! Capability Token Store
//!
//! Process-wide mapping from token id to record, with expiry and
//! single-use enforcement. Deliberately not persisted: a process restart
//! drops every in-flight flow, which the end user experiences as an
//! expired token.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use chrono::{DateTime, Duration, Utc};

use crate::error::TokenError;
use crate::token::{TOKEN_TTL_MINUTES, TokenId, TokenRecord};

/// Clock abstraction so expiry can be tested deterministically.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time, the default.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for deterministic tests.
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Source of fresh token ids.
pub trait TokenSource: Send + Sync {
    fn mint(&self) -> TokenId;
}

/// OS-entropy token source, the default.
pub struct RandomTokenSource;

impl TokenSource for RandomTokenSource {
    fn mint(&self) -> TokenId {
        TokenId::generate()
    }
}

/// In-memory store for the capability tokens of one flow.
pub struct TokenStore<I> {
    records: RwLock<HashMap<TokenId, TokenRecord<I>>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    source: Arc<dyn TokenSource>,
}

impl<I: Clone> TokenStore<I> {
    pub fn new() -> Self {
        Self::with_ttl(Duration::minutes(TOKEN_TTL_MINUTES))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            ttl,
            clock: Arc::new(SystemClock),
            source: Arc::new(RandomTokenSource),
        }
    }

    /// Swap the clock out, for deterministic expiry in tests.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Swap the id source out, for deterministic ids in tests.
    #[must_use]
    pub fn with_source(mut self, source: Arc<dyn TokenSource>) -> Self {
        self.source = source;
        self
    }

    /// Issue a fresh token carrying `intent`, valid for the store's TTL.
    pub fn issue(&self, intent: I) -> TokenId {
        let id = self.source.mint();
        let now = self.clock.now();
        let record = TokenRecord {
            id: id.clone(),
            created_at: now,
            expires_at: now + self.ttl,
            used: false,
            session_id: None,
            intent,
        };

        let mut records = self.records.write().unwrap();
        records.insert(id.clone(), record);
        id
    }

    /// Bind the checkout session created for this token.
    pub fn attach_session(&self, token: &TokenId, session_id: &str) -> Result<(), TokenError> {
        let mut records = self.records.write().unwrap();
        let record = records.get_mut(token).ok_or(TokenError::NotFound)?;
        record.session_id = Some(session_id.to_string());
        Ok(())
    }

    /// Classify a token without mutating it.
    ///
    /// Expiry is checked before the used flag, so `AlreadyUsed` implies
    /// the token is still inside its validity window.
    pub fn validate(&self, token: &TokenId) -> Result<TokenRecord<I>, TokenError> {
        let records = self.records.read().unwrap();
        let record = records.get(token).ok_or(TokenError::NotFound)?;
        if record.is_expired_at(self.clock.now()) {
            return Err(TokenError::Expired);
        }
        if record.used {
            return Err(TokenError::AlreadyUsed);
        }
        Ok(record.clone())
    }

    /// Atomically check validity and mark the token used.
    ///
    /// The check and the flip happen under one write lock, so of two
    /// concurrent calls exactly one receives the record. That flip is the
    /// sole authorization for the gated side effect.
    pub fn consume(&self, token: &TokenId) -> Result<TokenRecord<I>, TokenError> {
        let mut records = self.records.write().unwrap();
        let record = records.get_mut(token).ok_or(TokenError::NotFound)?;
        if record.is_expired_at(self.clock.now()) {
            return Err(TokenError::Expired);
        }
        if record.used {
            return Err(TokenError::AlreadyUsed);
        }
        record.used = true;
        Ok(record.clone())
    }

    /// Drop every used or expired record. Returns how many were removed.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now();
        let mut records = self.records.write().unwrap();
        let before = records.len();
        records.retain(|_, record| !record.used && !record.is_expired_at(now));
        before - records.len()
    }

    pub fn len(&self) -> usize {
        self.records.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().unwrap().is_empty()
    }
}

impl<I: Clone> Default for TokenStore<I> {
    fn default() -> Self {
        Self::new()
    }
}
