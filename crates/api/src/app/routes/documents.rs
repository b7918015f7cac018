use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use serde_json::{Map, Value, json};

use atelier_auth::policy;
use atelier_projects::{Document, validate_file_size};

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::context::CurrentUser;

/// Attach a document to an existing comment. Owners and editors of the
/// owning project only; the comment comes from the payload.
pub async fn upload(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<dto::UploadDocumentRequest>,
) -> Result<axum::response::Response, ApiError> {
    let comment = services
        .comment_by_id(body.comment)?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    let role = services
        .projects
        .role_of(current.user_id(), comment.project_id)?;
    if !policy::is_member(role) {
        // Invisible project: same answer as an absent comment.
        return Err(ApiError::not_found("Comment not found"));
    }
    if !policy::is_editor_or_higher(role) {
        return Err(ApiError::forbidden(
            "Only owners and editors can add documents to comments",
        ));
    }

    if let Err(message) = validate_file_size(body.file.size_bytes) {
        let mut fields = Map::new();
        fields.insert(body.file.name.clone(), Value::String(message));
        return Err(ApiError::validation_fields("Invalid file", fields));
    }

    let document = Document::new(comment.id, current.user_id(), &body.file);
    services.projects.insert_document(document)?;

    Ok((
        StatusCode::OK,
        Json(json!({ "message": "document uploaded successfully" })),
    )
        .into_response())
}
