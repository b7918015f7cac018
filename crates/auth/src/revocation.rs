//! Token revocation: a TTL cache for access tokens and a durable denylist
//! for refresh tokens.
//!
//! Both storage collaborators are injected. The cache only needs atomic
//! `set`/`get` with self-evicting entries; the ledger is the durable record
//! of issued refresh tokens and their blacklist state.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use atelier_core::UserId;

use crate::claims::{TokenClaims, TokenUse};

const BLACKLIST_MARKER: &str = "blacklisted";

/// Cache key for a blacklisted access token, derived from the raw token
/// string.
fn access_token_key(raw: &str) -> String {
    format!("blacklisted_token_{raw}")
}

/// Time-bounded key/value cache.
///
/// Entries self-evict after their TTL; the revocation layer never cleans up
/// access-token entries manually.
pub trait TokenCache: Send + Sync {
    fn set(&self, key: &str, value: &str, ttl: Duration);
    fn get(&self, key: &str) -> Option<String>;
}

/// A refresh token that has been issued and not yet revoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutstandingToken {
    pub jti: Uuid,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("ledger storage failure: {0}")]
    Storage(String),
}

/// Durable record of issued refresh tokens and their blacklist state.
pub trait RefreshTokenLedger: Send + Sync {
    fn record(&self, token: OutstandingToken) -> Result<(), LedgerError>;

    /// Issued and not yet blacklisted tokens for `user`.
    fn outstanding_for_user(&self, user: UserId) -> Result<Vec<OutstandingToken>, LedgerError>;

    /// Durably blacklist the given jtis in one batch; returns how many were
    /// newly blacklisted.
    fn blacklist(&self, jtis: &[Uuid]) -> Result<usize, LedgerError>;

    fn is_blacklisted(&self, jti: &Uuid) -> Result<bool, LedgerError>;
}

/// Result of a batch refresh-token revocation.
///
/// Zero outstanding tokens is reported distinctly, not as success-with-zero-
/// effect: logout answers differently in the two cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationOutcome {
    Revoked(usize),
    NoActiveSessions,
}

/// Composes the TTL cache and the refresh ledger into the revocation store
/// consulted on every authenticated request.
#[derive(Clone)]
pub struct RevocationService {
    cache: Arc<dyn TokenCache>,
    ledger: Arc<dyn RefreshTokenLedger>,
}

impl RevocationService {
    pub fn new(cache: Arc<dyn TokenCache>, ledger: Arc<dyn RefreshTokenLedger>) -> Self {
        Self { cache, ledger }
    }

    /// Blacklist an access token for the remainder of its lifetime.
    ///
    /// Idempotent: re-blacklisting overwrites the entry. A non-positive
    /// remaining lifetime is a no-op; the token is already dead.
    pub fn blacklist_access_token(&self, raw: &str, remaining: Duration) {
        if remaining.is_zero() {
            return;
        }
        self.cache
            .set(&access_token_key(raw), BLACKLIST_MARKER, remaining);
    }

    /// O(1) lookup consulted at transport ingress for every bearer request.
    pub fn is_access_token_blacklisted(&self, raw: &str) -> bool {
        self.cache.get(&access_token_key(raw)).is_some()
    }

    /// Record a freshly issued refresh token in the outstanding ledger.
    pub fn record_issued(&self, refresh: &TokenClaims) -> Result<(), LedgerError> {
        debug_assert_eq!(refresh.token_use, TokenUse::Refresh);
        self.ledger.record(OutstandingToken {
            jti: refresh.jti,
            user_id: refresh.sub,
            created_at: refresh.issued_at(),
            expires_at: refresh.expires_at(),
        })
    }

    /// Durably blacklist every outstanding refresh token issued to `user`.
    pub fn blacklist_all_refresh_tokens(
        &self,
        user: UserId,
    ) -> Result<RevocationOutcome, LedgerError> {
        let outstanding = self.ledger.outstanding_for_user(user)?;
        if outstanding.is_empty() {
            return Ok(RevocationOutcome::NoActiveSessions);
        }
        let jtis: Vec<Uuid> = outstanding.iter().map(|t| t.jti).collect();
        let revoked = self.ledger.blacklist(&jtis)?;
        Ok(RevocationOutcome::Revoked(revoked))
    }

    pub fn is_refresh_token_blacklisted(&self, jti: &Uuid) -> Result<bool, LedgerError> {
        self.ledger.is_blacklisted(jti)
    }
}
