use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};

use atelier_auth::{Role, User};
use atelier_core::{CommentId, ProjectId, UserId};
use atelier_projects::{Comment, Document, Project, ProjectRole};

use super::{ProjectStore, StoreError, UserStore};

fn poisoned(what: &str) -> StoreError {
    StoreError::Storage(format!("{what} lock poisoned"))
}

/// In-memory user table.
///
/// Intended for tests/dev. Not optimized for performance.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for InMemoryUserStore {
    fn insert(&self, user: User) -> Result<(), StoreError> {
        self.users
            .write()
            .map_err(|_| poisoned("users"))?
            .insert(user.id, user);
        Ok(())
    }

    fn get(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .map_err(|_| poisoned("users"))?
            .get(&id)
            .cloned())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .map_err(|_| poisoned("users"))?
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .read()
            .map_err(|_| poisoned("users"))?
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    fn update(&self, user: User) -> Result<(), StoreError> {
        self.users
            .write()
            .map_err(|_| poisoned("users"))?
            .insert(user.id, user);
        Ok(())
    }

    fn touch_last_login(&self, id: UserId, when: DateTime<Utc>) -> Result<(), StoreError> {
        if let Some(user) = self
            .users
            .write()
            .map_err(|_| poisoned("users"))?
            .get_mut(&id)
        {
            user.last_login = Some(when);
        }
        Ok(())
    }
}

/// In-memory project state: projects, role rows, comments, documents.
///
/// All multi-row operations run inside one write-lock scope, which is what
/// gives them their all-or-nothing behavior here.
#[derive(Debug, Default)]
pub struct InMemoryProjectStore {
    inner: RwLock<ProjectState>,
}

#[derive(Debug, Default)]
struct ProjectState {
    projects: HashMap<ProjectId, Project>,
    roles: HashMap<(UserId, ProjectId), Role>,
    comments: HashMap<CommentId, Comment>,
    documents: HashMap<CommentId, Vec<Document>>,
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProjectStore for InMemoryProjectStore {
    fn insert_project(&self, project: Project, owner: ProjectRole) -> Result<(), StoreError> {
        let mut state = self.inner.write().map_err(|_| poisoned("projects"))?;
        state
            .roles
            .insert((owner.user_id, project.id), owner.role);
        state.projects.insert(project.id, project);
        Ok(())
    }

    fn get_project(&self, id: ProjectId) -> Result<Option<Project>, StoreError> {
        Ok(self
            .inner
            .read()
            .map_err(|_| poisoned("projects"))?
            .projects
            .get(&id)
            .cloned())
    }

    fn update_project(&self, project: Project) -> Result<(), StoreError> {
        self.inner
            .write()
            .map_err(|_| poisoned("projects"))?
            .projects
            .insert(project.id, project);
        Ok(())
    }

    fn delete_project(&self, id: ProjectId) -> Result<bool, StoreError> {
        let mut state = self.inner.write().map_err(|_| poisoned("projects"))?;
        if state.projects.remove(&id).is_none() {
            return Ok(false);
        }
        state.roles.retain(|(_, project_id), _| *project_id != id);
        let dead: Vec<CommentId> = state
            .comments
            .values()
            .filter(|c| c.project_id == id)
            .map(|c| c.id)
            .collect();
        for comment_id in dead {
            state.comments.remove(&comment_id);
            state.documents.remove(&comment_id);
        }
        Ok(true)
    }

    fn projects_for_user(&self, user: UserId) -> Result<Vec<Project>, StoreError> {
        let state = self.inner.read().map_err(|_| poisoned("projects"))?;
        let mut projects: Vec<Project> = state
            .roles
            .keys()
            .filter(|(user_id, _)| *user_id == user)
            .filter_map(|(_, project_id)| state.projects.get(project_id).cloned())
            .collect();
        projects.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(projects)
    }

    fn role_of(&self, user: UserId, project: ProjectId) -> Result<Option<Role>, StoreError> {
        Ok(self
            .inner
            .read()
            .map_err(|_| poisoned("projects"))?
            .roles
            .get(&(user, project))
            .copied())
    }

    fn roles_for_project(&self, project: ProjectId) -> Result<Vec<ProjectRole>, StoreError> {
        Ok(self
            .inner
            .read()
            .map_err(|_| poisoned("projects"))?
            .roles
            .iter()
            .filter(|((_, project_id), _)| *project_id == project)
            .map(|((user_id, project_id), role)| ProjectRole::new(*user_id, *project_id, *role))
            .collect())
    }

    fn has_any_membership(&self, user: UserId) -> Result<bool, StoreError> {
        Ok(self
            .inner
            .read()
            .map_err(|_| poisoned("projects"))?
            .roles
            .keys()
            .any(|(user_id, _)| *user_id == user))
    }

    fn insert_role(&self, row: ProjectRole) -> Result<(), StoreError> {
        let mut state = self.inner.write().map_err(|_| poisoned("projects"))?;
        let key = (row.user_id, row.project_id);
        if state.roles.contains_key(&key) {
            return Err(StoreError::DuplicateMembership);
        }
        state.roles.insert(key, row.role);
        Ok(())
    }

    fn update_role(
        &self,
        user: UserId,
        project: ProjectId,
        new_role: Role,
    ) -> Result<bool, StoreError> {
        let mut state = self.inner.write().map_err(|_| poisoned("projects"))?;
        match state.roles.get_mut(&(user, project)) {
            Some(role) => {
                *role = new_role;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn insert_comment(
        &self,
        comment: Comment,
        documents: Vec<Document>,
    ) -> Result<(), StoreError> {
        // One lock scope: the comment and its documents land together or not
        // at all.
        let mut state = self.inner.write().map_err(|_| poisoned("projects"))?;
        state.documents.insert(comment.id, documents);
        state.comments.insert(comment.id, comment);
        Ok(())
    }

    fn get_comment(&self, id: CommentId) -> Result<Option<Comment>, StoreError> {
        Ok(self
            .inner
            .read()
            .map_err(|_| poisoned("projects"))?
            .comments
            .get(&id)
            .cloned())
    }

    fn comments_for_project(&self, project: ProjectId) -> Result<Vec<Comment>, StoreError> {
        let state = self.inner.read().map_err(|_| poisoned("projects"))?;
        let mut comments: Vec<Comment> = state
            .comments
            .values()
            .filter(|c| c.project_id == project)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(comments)
    }

    fn delete_comment(&self, id: CommentId) -> Result<bool, StoreError> {
        let mut state = self.inner.write().map_err(|_| poisoned("projects"))?;
        let existed = state.comments.remove(&id).is_some();
        if existed {
            state.documents.remove(&id);
        }
        Ok(existed)
    }

    fn insert_document(&self, document: Document) -> Result<(), StoreError> {
        self.inner
            .write()
            .map_err(|_| poisoned("projects"))?
            .documents
            .entry(document.comment_id)
            .or_default()
            .push(document);
        Ok(())
    }

    fn documents_for_comment(&self, comment: CommentId) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .inner
            .read()
            .map_err(|_| poisoned("projects"))?
            .documents
            .get(&comment)
            .cloned()
            .unwrap_or_default())
    }
}
