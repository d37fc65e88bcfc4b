/// The authenticated actor
use serde::{Deserialize, Serialize};

use crate::models::{User, UserRole};

/// Identity and role of the actor performing an operation
///
/// Supplied by the identity layer (token validation) — the policy functions
/// and services never verify credentials themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// User ID of the actor
    pub id: String,

    /// Role of the actor
    pub role: UserRole,
}

impl Principal {
    /// Builds a principal from raw parts
    pub fn new(id: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }

    /// True if the principal is the user with the given ID
    pub fn is_self(&self, user_id: &str) -> bool {
        self.id == user_id
    }
}

impl From<&User> for Principal {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            role: user.role,
        }
    }
}
