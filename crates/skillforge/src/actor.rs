// Actor — the authenticated principal on whose behalf an operation runs.
//
// Authentication itself is an external collaborator: the host application's
// auth middleware resolves the session and hands the resulting Actor to the
// web layer. Every operation that needs attribution or an ownership check
// takes the Actor explicitly; nothing infers the acting user from the data
// being written.

use serde::{Deserialize, Serialize};

/// Roles recognized by the permission checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Instructor,
    Admin,
}

/// The authenticated principal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Whether this actor may manage content owned by `owner_id`
    /// (the owner themselves, or an admin).
    pub fn can_manage(&self, owner_id: &str) -> bool {
        self.id == owner_id || self.is_admin()
    }

    /// Whether this actor may create catalog content at all.
    pub fn can_author(&self) -> bool {
        matches!(self.role, Role::Instructor | Role::Admin)
    }
}
