//! Access-control gate.
//!
//! Capability checks composed per endpoint from the pure predicates in
//! `atelier_auth::policy` plus role lookups against the store. The fixed
//! evaluation order is: authentication (middleware) → coarse membership
//! (advisory) → object-level role on the resolved target; the first denial
//! short-circuits.
//!
//! Visibility rule: a project outside the actor's membership set answers 404,
//! the same as a project that does not exist. 403 is reserved for actors who
//! can see the resource but lack the tier.

use atelier_auth::policy;
use atelier_auth::Role;
use atelier_core::{CommentId, ProjectId, UserId};
use atelier_infra::ProjectStore;
use atelier_projects::{Comment, Project};

use crate::app::errors::ApiError;

/// Coarse check: does the actor hold any role on any project?
///
/// Advisory only: it mirrors the behavior of list endpoints but says nothing
/// about the specific target, so it is never a security boundary. The
/// object-level checks below stay authoritative.
pub fn advisory_member_of_any(
    store: &dyn ProjectStore,
    actor: UserId,
) -> Result<(), ApiError> {
    if store.has_any_membership(actor)? {
        Ok(())
    } else {
        Err(ApiError::forbidden("You are not a member of any project"))
    }
}

/// Resolve a project without any visibility filter (member-management paths,
/// where existence is checked before ownership).
pub fn require_existing_project(
    store: &dyn ProjectStore,
    project_id: ProjectId,
) -> Result<Project, ApiError> {
    store
        .get_project(project_id)?
        .ok_or_else(|| ApiError::not_found("Project not found"))
}

/// Resolve a project through the actor's membership: absent and invisible
/// both answer 404.
pub fn require_project_member(
    store: &dyn ProjectStore,
    actor: UserId,
    project_id: ProjectId,
) -> Result<(Project, Role), ApiError> {
    let project = store
        .get_project(project_id)?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;
    let role = store
        .role_of(actor, project_id)?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;
    Ok((project, role))
}

/// Member with at least EDITOR on a visible project.
pub fn require_editor_or_higher(
    store: &dyn ProjectStore,
    actor: UserId,
    project_id: ProjectId,
    deny_message: &str,
) -> Result<(Project, Role), ApiError> {
    let (project, role) = require_project_member(store, actor, project_id)?;
    if !policy::is_editor_or_higher(Some(role)) {
        return Err(ApiError::forbidden(deny_message));
    }
    Ok((project, role))
}

/// OWNER of a visible project.
pub fn require_project_owner(
    store: &dyn ProjectStore,
    actor: UserId,
    project_id: ProjectId,
    deny_message: &str,
) -> Result<Project, ApiError> {
    let (project, role) = require_project_member(store, actor, project_id)?;
    if !policy::is_owner(Some(role)) {
        return Err(ApiError::forbidden(deny_message));
    }
    Ok(project)
}

/// OWNER check on an already-resolved project (member-management paths:
/// existence was checked first, so a non-member actor gets 403 here, not
/// 404).
pub fn require_owner_of(
    store: &dyn ProjectStore,
    actor: UserId,
    project: &Project,
    deny_message: &str,
) -> Result<(), ApiError> {
    let role = store.role_of(actor, project.id)?;
    if !policy::is_owner(role) {
        return Err(ApiError::forbidden(deny_message));
    }
    Ok(())
}

/// Resolve a comment through the visibility of its owning project.
pub fn require_comment_visible(
    store: &dyn ProjectStore,
    actor: UserId,
    comment_id: CommentId,
) -> Result<(Comment, Role), ApiError> {
    let comment = store
        .get_comment(comment_id)?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;
    let role = store
        .role_of(actor, comment.project_id)?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;
    Ok((comment, role))
}

/// Comment deletion: project OWNER or the comment's author.
pub fn require_owner_or_author(
    store: &dyn ProjectStore,
    actor: UserId,
    comment_id: CommentId,
) -> Result<Comment, ApiError> {
    let comment = store
        .get_comment(comment_id)?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;
    let role = store.role_of(actor, comment.project_id)?;
    // Authors keep the capability even when their membership is gone.
    if comment.author_id != actor && role.is_none() {
        return Err(ApiError::not_found("Comment not found"));
    }
    if !policy::is_owner_or_author(actor, role, comment.author_id) {
        return Err(ApiError::forbidden(
            "Only the comment author or a project owner can delete this comment",
        ));
    }
    Ok(comment)
}
