use axum::{
    Router,
    routing::{get, post},
};

pub mod accounts;
pub mod auth;
pub mod comments;
pub mod documents;
pub mod members;
pub mod projects;
pub mod system;

/// Routes reachable without a bearer token.
pub fn public_router() -> Router {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/token/refresh", post(auth::refresh))
        .route("/auth/register", post(auth::register))
}

/// Router for all authenticated endpoints.
pub fn protected_router() -> Router {
    Router::new()
        .route("/auth/logout", post(auth::logout))
        .route(
            "/accounts/profile",
            get(accounts::profile)
                .patch(accounts::update_profile)
                .put(accounts::update_profile),
        )
        .route("/projects", get(projects::list).post(projects::create))
        .route(
            "/projects/:id",
            get(projects::detail)
                .patch(projects::update)
                .delete(projects::delete),
        )
        .route(
            "/projects/:id/members",
            post(members::add).patch(members::update_role),
        )
        .route("/projects/:id/comments", get(comments::list))
        .route("/comments", post(comments::create))
        .route("/comments/:id", get(comments::detail).delete(comments::delete))
        .route("/documents", post(documents::upload))
}
