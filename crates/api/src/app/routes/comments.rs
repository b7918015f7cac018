use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::{Map, Value, json};

use atelier_core::{CommentId, ProjectId};
use atelier_projects::{Comment, Document, validate_comment_payload, validate_files};

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::CurrentUser;

/// List comments under a project, newest first. Members only.
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<ProjectId>,
) -> Result<axum::response::Response, ApiError> {
    // Coarse check first (advisory), then the authoritative per-project one.
    authz::advisory_member_of_any(services.projects.as_ref(), current.user_id())?;
    authz::require_project_member(services.projects.as_ref(), current.user_id(), id)?;

    let comments = services.comments_json(id)?;
    Ok((StatusCode::OK, Json(json!({ "comments": comments }))).into_response())
}

/// Create a comment, optionally with attached files. Owners and editors only;
/// the target project comes from the payload.
pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<dto::CreateCommentRequest>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_editor_or_higher(
        services.projects.as_ref(),
        current.user_id(),
        body.project,
        "Only owners and editors can comment",
    )?;

    validate_comment_payload(&body.content, body.files.len())?;

    // Every file is validated before any row is written; all violations come
    // back together, keyed by filename.
    if let Err(errors) = validate_files(&body.files) {
        let mut fields = Map::new();
        for e in errors {
            fields.insert(e.file_name, Value::String(e.message));
        }
        return Err(ApiError::validation_fields("Invalid file(s)", fields));
    }

    let comment = Comment::new(body.project, current.user_id(), body.content);
    let documents: Vec<Document> = body
        .files
        .iter()
        .map(|f| Document::new(comment.id, current.user_id(), f))
        .collect();
    services.projects.insert_comment(comment.clone(), documents)?;

    Ok((StatusCode::CREATED, Json(services.comment_json(&comment)?)).into_response())
}

pub async fn detail(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<CommentId>,
) -> Result<axum::response::Response, ApiError> {
    let (comment, _role) =
        authz::require_comment_visible(services.projects.as_ref(), current.user_id(), id)?;
    Ok((StatusCode::OK, Json(services.comment_json(&comment)?)).into_response())
}

/// Delete a comment: allowed for the comment's author or an OWNER of its
/// project.
pub async fn delete(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<CommentId>,
) -> Result<axum::response::Response, ApiError> {
    let comment =
        authz::require_owner_or_author(services.projects.as_ref(), current.user_id(), id)?;
    services.projects.delete_comment(comment.id)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
