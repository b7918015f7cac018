use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::{DomainError, DomainResult, ProjectId};

pub const MAX_TITLE_LEN: usize = 200;

/// A project: the root of the permission hierarchy.
///
/// Owns its role rows and comments; deleting a project cascades to both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> DomainResult<Self> {
        let title = title.into();
        validate_title(&title)?;
        let now = Utc::now();
        Ok(Self {
            id: ProjectId::new(),
            title,
            description: description.into(),
            created_at: now,
            updated_at: now,
        })
    }
}

fn validate_title(title: &str) -> DomainResult<()> {
    if title.trim().is_empty() {
        return Err(DomainError::validation("title cannot be empty"));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::validation(format!(
            "title cannot exceed {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}

/// Partial update; empty/absent fields leave the current value in place.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl ProjectUpdate {
    pub fn apply_to(&self, project: &mut Project) -> DomainResult<()> {
        if let Some(title) = self.title.as_deref() {
            if !title.is_empty() {
                validate_title(title)?;
                project.title = title.to_string();
            }
        }
        if let Some(description) = self.description.as_deref() {
            if !description.is_empty() {
                project.description = description.to_string();
            }
        }
        project.updated_at = Utc::now();
        Ok(())
    }
}
