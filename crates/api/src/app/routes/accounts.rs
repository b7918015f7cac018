use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use atelier_auth::UserUpdate;

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::CurrentUser;

/// Account endpoints require a verified email on top of authentication.
fn require_verified_email(user: &CurrentUser) -> Result<(), ApiError> {
    if user.email_verified() {
        Ok(())
    } else {
        Err(ApiError::forbidden(
            "Email verification is required to access this resource",
        ))
    }
}

pub async fn profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<axum::response::Response, ApiError> {
    require_verified_email(&current)?;

    let user = services
        .users
        .get(current.user_id())?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok((StatusCode::OK, Json(dto::user_to_json(&user))).into_response())
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<UserUpdate>,
) -> Result<axum::response::Response, ApiError> {
    require_verified_email(&current)?;

    let mut user = services
        .users
        .get(current.user_id())?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    body.apply_to(&mut user);
    services.users.update(user.clone())?;

    Ok((StatusCode::OK, Json(dto::user_to_json(&user))).into_response())
}
