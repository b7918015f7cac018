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
use atelier_projects::{Project, ProjectRole, ProjectUpdate};

use crate::app::dto;
use crate::app::errors::ApiError;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::CurrentUser;

/// List the projects the authenticated user is a member of, most recently
/// updated first.
pub async fn list(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<axum::response::Response, ApiError> {
    authz::advisory_member_of_any(services.projects.as_ref(), current.user_id())?;

    let mut projects = Vec::new();
    for project in services.projects.projects_for_user(current.user_id())? {
        projects.push(services.project_json(&project)?);
    }
    Ok((StatusCode::OK, Json(json!({ "projects": projects }))).into_response())
}

/// Create a project; the creator is granted OWNER atomically with it.
pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Json(body): Json<dto::CreateProjectRequest>,
) -> Result<axum::response::Response, ApiError> {
    let project = Project::new(body.title, body.description)?;
    let owner = ProjectRole::new(current.user_id(), project.id, Role::Owner);
    services.projects.insert_project(project.clone(), owner)?;

    Ok((StatusCode::CREATED, Json(services.project_json(&project)?)).into_response())
}

pub async fn detail(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<ProjectId>,
) -> Result<axum::response::Response, ApiError> {
    let (project, _role) =
        authz::require_project_member(services.projects.as_ref(), current.user_id(), id)?;
    Ok((StatusCode::OK, Json(services.project_json(&project)?)).into_response())
}

pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<ProjectId>,
    Json(body): Json<ProjectUpdate>,
) -> Result<axum::response::Response, ApiError> {
    let mut project = authz::require_project_owner(
        services.projects.as_ref(),
        current.user_id(),
        id,
        "Only owners can update this project",
    )?;

    body.apply_to(&mut project)?;
    services.projects.update_project(project.clone())?;

    Ok((StatusCode::OK, Json(services.project_json(&project)?)).into_response())
}

pub async fn delete(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<ProjectId>,
) -> Result<axum::response::Response, ApiError> {
    authz::require_project_owner(
        services.projects.as_ref(),
        current.user_id(),
        id,
        "Only owners can delete this project",
    )?;

    services.projects.delete_project(id)?;
    Ok(StatusCode::NO_CONTENT.into_response())
}
