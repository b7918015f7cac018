//! HTTP API application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: store wiring + the auth/session flows
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router, routing::get};
use chrono::Duration;

use atelier_auth::TokenIssuer;
use atelier_auth::token::{DEFAULT_ACCESS_TTL_SECS, DEFAULT_REFRESH_TTL_SECS};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub jwt_secret: String,
    pub access_ttl_secs: i64,
    pub refresh_ttl_secs: i64,
}

impl AppConfig {
    pub fn new(jwt_secret: impl Into<String>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            access_ttl_secs: DEFAULT_ACCESS_TTL_SECS,
            refresh_ttl_secs: DEFAULT_REFRESH_TTL_SECS,
        }
    }

    /// Read configuration from the environment.
    pub fn from_env() -> Self {
        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let mut config = Self::new(jwt_secret);
        if let Some(secs) = env_i64("ACCESS_TOKEN_TTL_SECS") {
            config.access_ttl_secs = secs;
        }
        if let Some(secs) = env_i64("REFRESH_TOKEN_TTL_SECS") {
            config.refresh_ttl_secs = secs;
        }
        config
    }
}

fn env_i64(key: &str) -> Option<i64> {
    match std::env::var(key) {
        Ok(raw) => match raw.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%key, %raw, "ignoring unparseable env var");
                None
            }
        },
        Err(_) => None,
    }
}

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: AppConfig) -> Router {
    let issuer = Arc::new(TokenIssuer::new(
        config.jwt_secret.as_bytes(),
        Duration::seconds(config.access_ttl_secs),
        Duration::seconds(config.refresh_ttl_secs),
    ));
    let services = Arc::new(services::AppServices::in_memory(issuer.clone()));
    let auth_state = middleware::AuthState {
        issuer,
        revocation: services.revocation.clone(),
    };

    // Protected routes: require a live, non-blacklisted bearer token.
    let protected = routes::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state.clone(),
        middleware::auth_middleware,
    ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::public_router())
        .merge(protected)
        .layer(Extension(services))
        // Outermost: the blacklist check runs at ingress, before anything
        // else sees the token.
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::blacklist_middleware,
        ))
}
