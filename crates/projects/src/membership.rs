use serde::{Deserialize, Serialize};

use atelier_auth::Role;
use atelier_core::{ProjectId, UserId};

/// Membership row binding one user to one project with exactly one role.
///
/// The (user, project) pair is unique; the store rejects duplicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRole {
    pub user_id: UserId,
    pub project_id: ProjectId,
    pub role: Role,
}

impl ProjectRole {
    pub fn new(user_id: UserId, project_id: ProjectId, role: Role) -> Self {
        Self {
            user_id,
            project_id,
            role,
        }
    }
}
