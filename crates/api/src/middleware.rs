use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use atelier_auth::{RevocationService, TokenIssuer, TokenUse};

use crate::app::errors::ApiError;
use crate::context::CurrentUser;

#[derive(Clone)]
pub struct AuthState {
    pub issuer: Arc<TokenIssuer>,
    pub revocation: RevocationService,
}

/// Transport-ingress blacklist check.
///
/// Runs on every request, before claim validation and before the gate: a
/// bearer token found in the revocation cache is rejected outright, whatever
/// the route. Requests without a bearer header pass through untouched (the
/// auth middleware decides whether one was required).
pub async fn blacklist_middleware(
    State(state): State<AuthState>,
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(token) = bearer_token(req.headers()) {
        if state.revocation.is_access_token_blacklisted(token) {
            return Err(ApiError::auth("Token has been blacklisted"));
        }
    }
    Ok(next.run(req).await)
}

/// Bearer authentication for protected routes.
///
/// Verifies the access token's signature and claim window, then exposes the
/// identity to handlers as a [`CurrentUser`] extension.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| ApiError::auth("Authentication credentials were not provided"))?
        .to_string();

    let claims = state
        .issuer
        .decode(&token, TokenUse::Access)
        .map_err(|e| ApiError::auth(e.to_string()))?;

    req.extensions_mut().insert(CurrentUser::new(&claims, token));

    Ok(next.run(req).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() { None } else { Some(token) }
}
