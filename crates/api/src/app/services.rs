//! Service wiring and the auth/session flows that compose more than one
//! collaborator (stores, issuer, revocation).

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};

use atelier_auth::{
    IssuedPair, Registration, RevocationOutcome, RevocationService, TokenError, TokenIssuer,
    TokenUse, User, hash_password, verify_password,
};
use atelier_core::{CommentId, ProjectId, UserId};
use atelier_infra::{
    InMemoryProjectStore, InMemoryRefreshTokenLedger, InMemoryTokenCache, InMemoryUserStore,
    ProjectStore, UserStore,
};
use atelier_projects::Comment;

use crate::app::dto;
use crate::app::errors::ApiError;

/// Result of the logout sequence; the two success cases answer differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutOutcome {
    LoggedOut,
    NoActiveSessions,
}

pub struct AppServices {
    pub users: Arc<dyn UserStore>,
    pub projects: Arc<dyn ProjectStore>,
    pub issuer: Arc<TokenIssuer>,
    pub revocation: RevocationService,
}

impl AppServices {
    /// Wire the in-memory backends.
    pub fn in_memory(issuer: Arc<TokenIssuer>) -> Self {
        Self {
            users: Arc::new(InMemoryUserStore::new()),
            projects: Arc::new(InMemoryProjectStore::new()),
            issuer,
            revocation: RevocationService::new(
                Arc::new(InMemoryTokenCache::new()),
                Arc::new(InMemoryRefreshTokenLedger::new()),
            ),
        }
    }

    // ---- auth flows ----

    /// Register a new account. The account is activated immediately; email
    /// verification is a separate flow and starts out false.
    pub fn register(&self, registration: Registration) -> Result<(User, IssuedPair), ApiError> {
        if let Err(errors) = registration.validate() {
            let mut fields = Map::new();
            for e in errors {
                fields.insert(e.field.to_string(), Value::String(e.message));
            }
            return Err(ApiError::validation_fields("Invalid registration data", fields));
        }

        let email = registration.email.trim().to_lowercase();
        let username = registration.derived_username();

        let mut fields = Map::new();
        if self.users.find_by_email(&email)?.is_some() {
            fields.insert(
                "email".to_string(),
                Value::String("A user with this email already exists".to_string()),
            );
        }
        if self.users.find_by_username(&username)?.is_some() {
            fields.insert(
                "username".to_string(),
                Value::String("A user with this username already exists".to_string()),
            );
        }
        if !fields.is_empty() {
            return Err(ApiError::validation_fields("Invalid registration data", fields));
        }

        let password_hash =
            hash_password(&registration.password).map_err(|e| ApiError::internal(e.to_string()))?;

        let user = User {
            id: UserId::new(),
            email,
            username,
            first_name: registration.first_name.trim().to_string(),
            last_name: registration.last_name.trim().to_string(),
            bio: registration.bio.clone(),
            contact_number: registration.contact_number.clone(),
            is_active: true,
            email_verified: false,
            password_hash,
            last_login: None,
            date_joined: Utc::now(),
        };
        self.users.insert(user.clone())?;

        let pair = self.issue_pair_recorded(&user)?;
        Ok((user, pair))
    }

    /// Validate credentials and mint a token pair.
    ///
    /// Unknown email, wrong password and inactive account all collapse into
    /// the same 401 so account existence cannot be enumerated.
    pub fn login(&self, email: &str, password: &str) -> Result<IssuedPair, ApiError> {
        const DENIED: &str = "No active account found with the given credentials";

        let email = email.trim().to_lowercase();
        let user = self
            .users
            .find_by_email(&email)?
            .ok_or_else(|| ApiError::auth(DENIED))?;
        if !user.is_active || !verify_password(&user.password_hash, password) {
            return Err(ApiError::auth(DENIED));
        }

        let pair = self.issue_pair_recorded(&user)?;
        self.users.touch_last_login(user.id, Utc::now())?;
        Ok(pair)
    }

    /// Re-derive an access token from a refresh token.
    pub fn refresh(&self, raw_refresh: &str) -> Result<String, ApiError> {
        let claims = self
            .issuer
            .decode(raw_refresh, TokenUse::Refresh)
            .map_err(|e| match e {
                TokenError::Encode(msg) => ApiError::internal(msg),
                _ => ApiError::auth("Token is invalid or expired"),
            })?;

        if self.revocation.is_refresh_token_blacklisted(&claims.jti)? {
            return Err(ApiError::auth("Token is blacklisted"));
        }

        // Refresh counts as an authentication event, but a failed timestamp
        // write must not interrupt the refresh itself.
        if let Err(e) = self.users.touch_last_login(claims.sub, Utc::now()) {
            tracing::warn!(error = %e, "failed to update last_login during refresh");
        }

        self.issuer
            .refresh_access(&claims)
            .map_err(|e| ApiError::internal(e.to_string()))
    }

    /// The logout sequence.
    ///
    /// The access-token step is best-effort: a malformed or expired access
    /// token is logged and skipped, and must never prevent refresh-token
    /// revocation.
    pub fn logout(
        &self,
        auth_header: Option<&str>,
        user_id: UserId,
    ) -> Result<LogoutOutcome, ApiError> {
        let header = auth_header.ok_or_else(|| ApiError::validation("Invalid token format"))?;
        let raw = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::validation("Invalid token format"))?;

        match self.issuer.decode_signature_only(raw) {
            Ok(claims) => {
                let remaining = claims.remaining_lifetime(Utc::now());
                if let Ok(ttl) = remaining.to_std() {
                    // to_std() errs on negative durations: an already-expired
                    // token needs no cache entry.
                    self.revocation.blacklist_access_token(raw, ttl);
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "ignoring undecodable access token during logout");
            }
        }

        let outcome = self
            .revocation
            .blacklist_all_refresh_tokens(user_id)
            .map_err(|e| ApiError::internal(format!("An error occurred while logging out: {e}")))?;

        Ok(match outcome {
            RevocationOutcome::Revoked(_) => LogoutOutcome::LoggedOut,
            RevocationOutcome::NoActiveSessions => LogoutOutcome::NoActiveSessions,
        })
    }

    fn issue_pair_recorded(&self, user: &User) -> Result<IssuedPair, ApiError> {
        let pair = self
            .issuer
            .issue_pair(user)
            .map_err(|e| ApiError::internal(e.to_string()))?;
        self.revocation.record_issued(&pair.refresh_claims)?;
        Ok(pair)
    }

    // ---- response assembly ----

    /// Project JSON with its member roles (and each member's profile).
    pub fn project_json(&self, project: &atelier_projects::Project) -> Result<Value, ApiError> {
        let mut member_roles = Vec::new();
        for row in self.projects.roles_for_project(project.id)? {
            let user = self.users.get(row.user_id)?;
            member_roles.push(dto::member_role_to_json(&row, user.as_ref()));
        }
        Ok(dto::project_to_json(project, member_roles))
    }

    /// Comment JSON with its author and attached documents.
    pub fn comment_json(&self, comment: &Comment) -> Result<Value, ApiError> {
        let author = self.users.get(comment.author_id)?;
        let documents = self.projects.documents_for_comment(comment.id)?;
        Ok(dto::comment_to_json(comment, author.as_ref(), &documents))
    }

    pub fn comments_json(&self, project: ProjectId) -> Result<Vec<Value>, ApiError> {
        self.projects
            .comments_for_project(project)?
            .iter()
            .map(|c| self.comment_json(c))
            .collect()
    }

    pub fn comment_by_id(&self, id: CommentId) -> Result<Option<Comment>, ApiError> {
        Ok(self.projects.get_comment(id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn services() -> AppServices {
        AppServices::in_memory(Arc::new(TokenIssuer::with_default_ttls(b"test-secret")))
    }

    fn registration(email: &str) -> Registration {
        Registration {
            email: email.to_string(),
            password: "sturdy-passphrase".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Smith".to_string(),
            bio: None,
            contact_number: None,
        }
    }

    #[test]
    fn logout_requires_bearer_format() {
        let svc = services();
        let user = UserId::new();

        for header in [None, Some("Token abc"), Some("bearer abc")] {
            let err = svc.logout(header, user).unwrap_err();
            assert!(matches!(err, ApiError::Validation { ref message, .. } if message == "Invalid token format"));
        }
    }

    #[test]
    fn logout_survives_a_garbage_access_token() {
        let svc = services();
        let (user, pair) = svc.register(registration("alice@example.com")).unwrap();

        // The access-token step is best-effort: garbage after "Bearer " must
        // not stop refresh revocation.
        let outcome = svc.logout(Some("Bearer not-a-jwt"), user.id).unwrap();
        assert_eq!(outcome, LogoutOutcome::LoggedOut);
        assert!(
            svc.revocation
                .is_refresh_token_blacklisted(&pair.refresh_claims.jti)
                .unwrap()
        );
        // And nothing landed in the access-token cache.
        assert!(!svc.revocation.is_access_token_blacklisted("not-a-jwt"));
    }

    #[test]
    fn duplicate_email_and_username_are_field_keyed() {
        let svc = services();
        svc.register(registration("alice@example.com")).unwrap();

        // Same email; same derived username too.
        let err = svc.register(registration("alice@example.com")).unwrap_err();
        let ApiError::Validation { fields, .. } = err else {
            panic!("expected a validation error");
        };
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("username"));

        // Different email, colliding local part -> username only.
        let err = svc.register(registration("alice@other.org")).unwrap_err();
        let ApiError::Validation { fields, .. } = err else {
            panic!("expected a validation error");
        };
        assert!(!fields.contains_key("email"));
        assert!(fields.contains_key("username"));
    }

    #[test]
    fn login_updates_last_login_once() {
        let svc = services();
        let (user, _) = svc.register(registration("alice@example.com")).unwrap();
        assert!(svc.users.get(user.id).unwrap().unwrap().last_login.is_none());

        svc.login("alice@example.com", "sturdy-passphrase").unwrap();
        let after = svc.users.get(user.id).unwrap().unwrap();
        assert!(after.last_login.is_some());
    }
}
