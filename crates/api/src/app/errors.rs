use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::{Map, Value, json};
use thiserror::Error;

use atelier_auth::LedgerError;
use atelier_core::DomainError;
use atelier_infra::StoreError;

/// API-level error, carrying everything needed to render the HTTP response.
///
/// The variants mirror the error taxonomy: authentication (401), validation
/// (400, optionally field-keyed), authorization (403), visibility/absence
/// (404), and unexpected failures (500, cause included in the message).
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Auth(String),

    #[error("{message}")]
    Validation {
        message: String,
        /// Field name (or filename) → violation message.
        fields: Map<String, Value>,
    },

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            fields: Map::new(),
        }
    }

    pub fn validation_fields(message: impl Into<String>, fields: Map<String, Value>) -> Self {
        Self::Validation {
            message: message.into(),
            fields,
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateMembership => ApiError::validation("User is already a member"),
            StoreError::Storage(msg) => ApiError::internal(msg),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::internal(err.to_string())
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound => ApiError::not_found("not found"),
            DomainError::Unauthorized => ApiError::forbidden("forbidden"),
            DomainError::Validation(msg)
            | DomainError::InvariantViolation(msg)
            | DomainError::InvalidId(msg)
            | DomainError::Conflict(msg) => ApiError::validation(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::Auth(message) => {
                json_error(StatusCode::UNAUTHORIZED, "unauthorized", message)
            }
            ApiError::Validation { message, fields } if fields.is_empty() => {
                json_error(StatusCode::BAD_REQUEST, "validation_error", message)
            }
            ApiError::Validation { message, fields } => (
                StatusCode::BAD_REQUEST,
                axum::Json(json!({
                    "error": "validation_error",
                    "message": message,
                    "validations": fields,
                })),
            )
                .into_response(),
            ApiError::Forbidden(message) => {
                json_error(StatusCode::FORBIDDEN, "forbidden", message)
            }
            ApiError::NotFound(message) => {
                json_error(StatusCode::NOT_FOUND, "not_found", message)
            }
            ApiError::Internal(message) => {
                tracing::error!(%message, "internal error");
                json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
