use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde_json::json;

use atelier_auth::Registration;

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::{AppServices, LogoutOutcome};
use crate::context::CurrentUser;

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> Result<axum::response::Response, ApiError> {
    let pair = services.login(&body.email, &body.password)?;
    Ok((
        StatusCode::OK,
        Json(json!({
            "tokens": {
                "access": pair.access,
                "refresh": pair.refresh,
            }
        })),
    )
        .into_response())
}

pub async fn refresh(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RefreshRequest>,
) -> Result<axum::response::Response, ApiError> {
    let access = services.refresh(&body.refresh)?;
    Ok((StatusCode::OK, Json(json!({ "access": access }))).into_response())
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<Registration>,
) -> Result<axum::response::Response, ApiError> {
    let (user, pair) = services.register(body)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "user": dto::user_to_json(&user),
            "tokens": {
                "access": pair.access,
                "refresh": pair.refresh,
            }
        })),
    )
        .into_response())
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<CurrentUser>,
    headers: HeaderMap,
) -> Result<axum::response::Response, ApiError> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let detail = match services.logout(auth_header, user.user_id())? {
        LogoutOutcome::LoggedOut => "Successfully logged out",
        LogoutOutcome::NoActiveSessions => "No active sessions found",
    };
    Ok((StatusCode::OK, Json(json!({ "detail": detail }))).into_response())
}
