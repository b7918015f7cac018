use core::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Project-scoped role.
///
/// A closed, ordered enum: OWNER > EDITOR > READER. Unrecognized literals are
/// rejected at the input-validation boundary (`FromStr`), never at the
/// storage layer.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Owner,
    Editor,
    Reader,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("'{0}' is not a valid role; expected one of OWNER, EDITOR, READER")]
pub struct InvalidRoleError(pub String);

impl Role {
    /// Tier rank. Higher rank grants every capability of the tiers below it.
    pub fn rank(&self) -> u8 {
        match self {
            Role::Owner => 3,
            Role::Editor => 2,
            Role::Reader => 1,
        }
    }

    pub fn at_least(&self, floor: Role) -> bool {
        self.rank() >= floor.rank()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "OWNER",
            Role::Editor => "EDITOR",
            Role::Reader => "READER",
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = InvalidRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OWNER" => Ok(Role::Owner),
            "EDITOR" => Ok(Role::Editor),
            "READER" => Ok(Role::Reader),
            other => Err(InvalidRoleError(other.to_string())),
        }
    }
}
