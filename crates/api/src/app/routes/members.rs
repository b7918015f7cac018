use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::json;

use atelier_auth::Role;
use atelier_core::ProjectId;
use atelier_projects::ProjectRole;

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::CurrentUser;

/// Parse a role literal from the payload; rejected before any permission
/// check runs.
fn parse_role(raw: &str) -> Result<Role, ApiError> {
    raw.parse::<Role>().map_err(|e| ApiError::validation(e.to_string()))
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Add a member to a project. Only owners can add members.
pub async fn add(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<ProjectId>,
    Json(body): Json<dto::AddMemberRequest>,
) -> Result<axum::response::Response, ApiError> {
    let project = authz::require_existing_project(services.projects.as_ref(), id)?;
    let role = parse_role(&body.role)?;
    authz::require_owner_of(
        services.projects.as_ref(),
        current.user_id(),
        &project,
        "Only owners can add members",
    )?;

    let target = services
        .users
        .get(body.user_id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    services
        .projects
        .insert_role(ProjectRole::new(target.id, project.id, role))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": format!(
                "{} successfully added to project {}",
                title_case(&target.username),
                project.title
            )
        })),
    )
        .into_response())
}

/// Update a member's role. Only owners can update member roles.
///
/// Project existence is checked before anything else: a non-owner probing a
/// nonexistent id learns only that it does not exist.
pub async fn update_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<ProjectId>,
    Json(body): Json<dto::UpdateMemberRoleRequest>,
) -> Result<axum::response::Response, ApiError> {
    let project = authz::require_existing_project(services.projects.as_ref(), id)?;
    let new_role = parse_role(&body.role)?;
    authz::require_owner_of(
        services.projects.as_ref(),
        current.user_id(),
        &project,
        "Only owners can update member roles",
    )?;

    let updated = services
        .projects
        .update_role(body.user_id, project.id, new_role)?;
    if !updated {
        return Err(ApiError::not_found("User not a member of this project"));
    }

    Ok((StatusCode::OK, Json(json!({ "message": "role updated" }))).into_response())
}
