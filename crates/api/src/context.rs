use atelier_auth::TokenClaims;
use atelier_core::UserId;

/// The authenticated identity for a request, derived from verified access
/// claims by the auth middleware.
///
/// Carries the raw bearer string as well: logout blacklists the exact token
/// the client presented.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentUser {
    user_id: UserId,
    username: String,
    email: String,
    email_verified: bool,
    raw_token: String,
}

impl CurrentUser {
    pub fn new(claims: &TokenClaims, raw_token: impl Into<String>) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username.clone(),
            email: claims.email.clone(),
            email_verified: claims.email_verified,
            raw_token: raw_token.into(),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn email_verified(&self) -> bool {
        self.email_verified
    }

    pub fn raw_token(&self) -> &str {
        &self.raw_token
    }
}
