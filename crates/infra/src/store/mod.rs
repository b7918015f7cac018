//! Store traits for the relational-style state: users, projects, role rows,
//! comments, documents.
//!
//! Implementations must provide per-row atomicity; callers never take locks
//! of their own. Multi-row operations that must be all-or-nothing (project
//! creation with its owner row, comment creation with its documents, cascade
//! deletes) are single trait methods so an implementation can make them one
//! transaction.

use thiserror::Error;

use atelier_auth::{Role, User};
use atelier_core::{CommentId, ProjectId, UserId};
use atelier_projects::{Comment, Document, Project, ProjectRole};

mod in_memory;

pub use in_memory::{InMemoryProjectStore, InMemoryUserStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store failure: {0}")]
    Storage(String),

    /// The (user, project) membership row already exists.
    #[error("user is already a member")]
    DuplicateMembership,
}

pub trait UserStore: Send + Sync {
    fn insert(&self, user: User) -> Result<(), StoreError>;
    fn get(&self, id: UserId) -> Result<Option<User>, StoreError>;
    fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    /// Overwrite the row for `user.id`.
    fn update(&self, user: User) -> Result<(), StoreError>;
    fn touch_last_login(
        &self,
        id: UserId,
        when: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), StoreError>;
}

pub trait ProjectStore: Send + Sync {
    /// Create a project together with its OWNER row, atomically.
    fn insert_project(&self, project: Project, owner: ProjectRole) -> Result<(), StoreError>;
    fn get_project(&self, id: ProjectId) -> Result<Option<Project>, StoreError>;
    fn update_project(&self, project: Project) -> Result<(), StoreError>;
    /// Delete a project, cascading to role rows, comments and documents.
    /// Returns false when no such project exists.
    fn delete_project(&self, id: ProjectId) -> Result<bool, StoreError>;
    /// Projects the user holds any role on, most recently updated first.
    fn projects_for_user(&self, user: UserId) -> Result<Vec<Project>, StoreError>;

    fn role_of(&self, user: UserId, project: ProjectId) -> Result<Option<Role>, StoreError>;
    fn roles_for_project(&self, project: ProjectId) -> Result<Vec<ProjectRole>, StoreError>;
    /// Whether the user holds any role on any project (coarse check).
    fn has_any_membership(&self, user: UserId) -> Result<bool, StoreError>;
    /// Insert a membership row; fails with [`StoreError::DuplicateMembership`]
    /// when the (user, project) pair already exists.
    fn insert_role(&self, row: ProjectRole) -> Result<(), StoreError>;
    /// Overwrite the role on an existing membership row. Returns false when
    /// no row exists for the pair.
    fn update_role(
        &self,
        user: UserId,
        project: ProjectId,
        new_role: Role,
    ) -> Result<bool, StoreError>;

    /// Insert a comment and its documents in one atomic step.
    fn insert_comment(
        &self,
        comment: Comment,
        documents: Vec<Document>,
    ) -> Result<(), StoreError>;
    fn get_comment(&self, id: CommentId) -> Result<Option<Comment>, StoreError>;
    /// Comments under a project, newest first.
    fn comments_for_project(&self, project: ProjectId) -> Result<Vec<Comment>, StoreError>;
    /// Delete a comment, cascading to its documents. Returns false when no
    /// such comment exists.
    fn delete_comment(&self, id: CommentId) -> Result<bool, StoreError>;
    fn insert_document(&self, document: Document) -> Result<(), StoreError>;
    fn documents_for_comment(&self, comment: CommentId) -> Result<Vec<Document>, StoreError>;
}
