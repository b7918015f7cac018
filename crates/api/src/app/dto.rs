//! Request DTOs and JSON mapping helpers.

use serde::Deserialize;
use serde_json::{Value, json};

use atelier_auth::User;
use atelier_core::{CommentId, ProjectId, UserId};
use atelier_projects::{Comment, Document, FileUpload, Project, ProjectRole};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberRequest {
    pub user_id: UserId,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemberRoleRequest {
    pub user_id: UserId,
    pub role: String,
}

/// Comment creation names its target project in the payload: the comment
/// does not exist yet, so the gate has no resolved object to work from.
#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub project: ProjectId,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub files: Vec<FileUpload>,
}

#[derive(Debug, Deserialize)]
pub struct UploadDocumentRequest {
    pub comment: CommentId,
    pub file: FileUpload,
}

// -------------------------
// Response mapping
// -------------------------

pub fn user_to_json(user: &User) -> Value {
    json!({
        "id": user.id,
        "email": user.email,
        "username": user.username,
        "first_name": user.first_name,
        "last_name": user.last_name,
        "is_active": user.is_active,
        "email_verified": user.email_verified,
        "contact_number": user.contact_number,
        "bio": user.bio,
    })
}

fn simplified_user_to_json(user: &User) -> Value {
    json!({ "username": user.username })
}

pub fn member_role_to_json(row: &ProjectRole, user: Option<&User>) -> Value {
    json!({
        "user": user.map(user_to_json),
        "role": row.role,
    })
}

pub fn project_to_json(project: &Project, member_roles: Vec<Value>) -> Value {
    json!({
        "id": project.id,
        "title": project.title,
        "description": project.description,
        "created_at": project.created_at,
        "updated_at": project.updated_at,
        "member_roles": member_roles,
    })
}

pub fn document_to_json(document: &Document) -> Value {
    json!({
        "id": document.id,
        "comment": document.comment_id,
        "file": document.storage_key,
        "file_name": document.file_name,
        "size_bytes": document.size_bytes,
    })
}

pub fn comment_to_json(comment: &Comment, author: Option<&User>, documents: &[Document]) -> Value {
    json!({
        "id": comment.id,
        "project": comment.project_id,
        "user": author.map(simplified_user_to_json),
        "content": comment.content,
        "created_at": comment.created_at,
        "documents": documents.iter().map(document_to_json).collect::<Vec<_>>(),
    })
}
