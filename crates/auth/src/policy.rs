//! Pure authorization predicates.
//!
//! Each predicate is a function over the actor's resolved role on the target
//! project (and, where relevant, the target's author). Endpoints compose
//! them with plain boolean logic; there is no permission-class hierarchy.
//!
//! - No IO
//! - No panics
//! - No business logic

use atelier_core::UserId;

use crate::role::Role;

/// Any role on the project counts as membership.
pub fn is_member(role: Option<Role>) -> bool {
    role.is_some()
}

/// OWNER or EDITOR.
pub fn is_editor_or_higher(role: Option<Role>) -> bool {
    matches!(role, Some(r) if r.at_least(Role::Editor))
}

pub fn is_owner(role: Option<Role>) -> bool {
    matches!(role, Some(Role::Owner))
}

/// Project OWNER **or** the comment's author.
///
/// A capability union, not a tier check: an author holding only READER may
/// still delete their own comment.
pub fn is_owner_or_author(actor: UserId, actor_role: Option<Role>, author: UserId) -> bool {
    is_owner(actor_role) || actor == author
}
