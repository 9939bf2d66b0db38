use serde::{Deserialize, Serialize};

use quill_core::UserId;

use crate::Role;

/// An authenticated identity resolved from a request credential.
///
/// Identities are created by an external registration flow; this type is a
/// read-only view of one, as carried inside the session credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub fn new(user_id: UserId, email: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            email: email.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
