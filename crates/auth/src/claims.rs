use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use atelier_core::UserId;

/// Which half of a token pair a set of claims belongs to.
///
/// Presenting an access token where a refresh token is expected (or the other
/// way round) must fail validation, so the marker is part of the signed
/// payload.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenUse {
    Access,
    Refresh,
}

/// JWT claims model (transport-agnostic).
///
/// Both halves of a pair carry the same identity claims: subject id,
/// username, email and the email-verified flag. A refresh-derived access
/// token copies all four and regenerates `jti`/`iat`/`exp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject / user identifier.
    pub sub: UserId,

    pub username: String,

    pub email: String,

    pub email_verified: bool,

    /// Access vs refresh marker.
    pub token_use: TokenUse,

    /// Unique token id; the durable refresh denylist is keyed by this.
    pub jti: Uuid,

    /// Issued-at, seconds since epoch.
    pub iat: i64,

    /// Expiration, seconds since epoch.
    pub exp: i64,
}

impl TokenClaims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Time left until expiry as of `now`. Negative when already expired.
    pub fn remaining_lifetime(&self, now: DateTime<Utc>) -> Duration {
        self.expires_at() - now
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (iat is in the future)")]
    NotYetValid,

    #[error("invalid token time window (exp <= iat)")]
    InvalidTimeWindow,

    #[error("wrong token type for this operation")]
    WrongUse,
}

/// Deterministically validate claims against a point in time.
///
/// Note: this validates the *claims* only. Signature verification and
/// decoding live in [`crate::token`].
pub fn validate_claims(
    claims: &TokenClaims,
    expected_use: TokenUse,
    now: DateTime<Utc>,
) -> Result<(), TokenValidationError> {
    if claims.token_use != expected_use {
        return Err(TokenValidationError::WrongUse);
    }
    if claims.exp <= claims.iat {
        return Err(TokenValidationError::InvalidTimeWindow);
    }
    if now < claims.issued_at() {
        return Err(TokenValidationError::NotYetValid);
    }
    if now >= claims.expires_at() {
        return Err(TokenValidationError::Expired);
    }
    Ok(())
}
