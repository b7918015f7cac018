use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use atelier_core::{CommentId, DomainError, DomainResult, ProjectId, UserId};

/// A comment under a project.
///
/// Content may be empty only when at least one document is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub project_id: ProjectId,
    pub author_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(project_id: ProjectId, author_id: UserId, content: impl Into<String>) -> Self {
        Self {
            id: CommentId::new(),
            project_id,
            author_id,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// A comment must carry non-empty content OR at least one attached document,
/// never neither.
pub fn validate_comment_payload(content: &str, attached_files: usize) -> DomainResult<()> {
    if content.trim().is_empty() && attached_files == 0 {
        return Err(DomainError::validation(
            "Comment must have either content or file added.",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_comment_without_files_is_invalid() {
        assert!(validate_comment_payload("", 0).is_err());
        assert!(validate_comment_payload("   ", 0).is_err());
    }

    #[test]
    fn content_or_files_satisfies_the_invariant() {
        assert!(validate_comment_payload("looks good", 0).is_ok());
        assert!(validate_comment_payload("", 1).is_ok());
        assert!(validate_comment_payload("both", 2).is_ok());
    }
}
