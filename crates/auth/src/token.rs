//! HS256 token issuance and verification.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use uuid::Uuid;

use crate::claims::{TokenClaims, TokenUse, TokenValidationError, validate_claims};
use crate::user::User;

/// Default access-token lifetime: 30 minutes.
pub const DEFAULT_ACCESS_TTL_SECS: i64 = 30 * 60;
/// Default refresh-token lifetime: 24 hours.
pub const DEFAULT_REFRESH_TTL_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Error)]
pub enum TokenError {
    /// Signature mismatch, garbage input, or claims that fail validation.
    #[error("token is invalid: {0}")]
    Invalid(String),

    #[error("token has expired")]
    Expired,

    #[error("token has been revoked")]
    Revoked,

    #[error("failed to encode token: {0}")]
    Encode(String),
}

impl From<TokenValidationError> for TokenError {
    fn from(err: TokenValidationError) -> Self {
        match err {
            TokenValidationError::Expired => TokenError::Expired,
            other => TokenError::Invalid(other.to_string()),
        }
    }
}

/// A freshly minted access/refresh pair.
///
/// The refresh claims are handed back so the caller can record the token in
/// the outstanding ledger without re-decoding it.
#[derive(Debug, Clone)]
pub struct IssuedPair {
    pub access: String,
    pub access_claims: TokenClaims,
    pub refresh: String,
    pub refresh_claims: TokenClaims,
}

/// Mints and verifies HS256 token pairs.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn with_default_ttls(secret: &[u8]) -> Self {
        Self::new(
            secret,
            Duration::seconds(DEFAULT_ACCESS_TTL_SECS),
            Duration::seconds(DEFAULT_REFRESH_TTL_SECS),
        )
    }

    fn mint(
        &self,
        user: &User,
        token_use: TokenUse,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<(String, TokenClaims), TokenError> {
        let claims = TokenClaims {
            sub: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            email_verified: user.email_verified,
            token_use,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        let raw = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))?;
        Ok((raw, claims))
    }

    /// Mint an access/refresh pair for a user.
    pub fn issue_pair(&self, user: &User) -> Result<IssuedPair, TokenError> {
        let now = Utc::now();
        let (access, access_claims) = self.mint(user, TokenUse::Access, self.access_ttl, now)?;
        let (refresh, refresh_claims) = self.mint(user, TokenUse::Refresh, self.refresh_ttl, now)?;
        Ok(IssuedPair {
            access,
            access_claims,
            refresh,
            refresh_claims,
        })
    }

    /// Re-derive an access token from verified refresh claims.
    ///
    /// Copies the identity claims (sub, username, email, email_verified) and
    /// regenerates jti/iat/exp.
    pub fn refresh_access(&self, refresh: &TokenClaims) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = TokenClaims {
            sub: refresh.sub,
            username: refresh.username.clone(),
            email: refresh.email.clone(),
            email_verified: refresh.email_verified,
            token_use: TokenUse::Access,
            jti: Uuid::new_v4(),
            iat: now.timestamp(),
            exp: (now + self.access_ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }

    /// Verify signature and claims for the expected token use.
    pub fn decode(&self, raw: &str, expected_use: TokenUse) -> Result<TokenClaims, TokenError> {
        let claims = self.decode_signature_only(raw)?;
        validate_claims(&claims, expected_use, Utc::now())?;
        Ok(claims)
    }

    /// Verify the signature but skip the time-window checks.
    ///
    /// Logout uses this to blacklist an access token that may already have
    /// expired; the caller decides what a non-positive remaining lifetime
    /// means.
    pub fn decode_signature_only(&self, raw: &str) -> Result<TokenClaims, TokenError> {
        // Time-window checks are done deterministically by `validate_claims`,
        // not by the JWT library.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<TokenClaims>(raw, &self.decoding, &validation)
            .map_err(|e| TokenError::Invalid(e.to_string()))?;
        Ok(data.claims)
    }
}
