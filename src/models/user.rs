/// User model
///
/// Users carry one of three roles which drive every authorization rule in
/// [`crate::auth::policy`]. Passwords are stored as Argon2id PHC hashes,
/// never in plaintext. Accounts start inactive when email verification is in
/// play and are activated by the verification flow.
///
/// # Example
///
/// ```
/// use eventhub::models::UserRole;
///
/// assert!(UserRole::Admin.can_manage_events());
/// assert!(UserRole::Organizer.can_manage_events());
/// assert!(!UserRole::Participant.can_manage_events());
/// ```
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Role of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full access to every record and listing
    Admin,

    /// Can create and manage own events, list participants
    Organizer,

    /// Can register for events and manage own registrations
    Participant,
}

impl UserRole {
    /// Role as its stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Organizer => "organizer",
            UserRole::Participant => "participant",
        }
    }

    /// Can create and update events
    pub fn can_manage_events(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::Organizer)
    }

    /// Can create registrations
    pub fn can_register(&self) -> bool {
        matches!(self, UserRole::Participant | UserRole::Organizer)
    }

    /// Sees every user record and may act on any of them
    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User account record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique user ID (UUID v4, stored as a string)
    pub id: String,

    /// Display name
    pub name: String,

    /// Email address; unique among non-deleted users
    pub email: String,

    /// Argon2id PHC hash — never a plaintext password
    pub password_hash: String,

    /// Contact phone number
    pub phone: String,

    /// Public URL of the profile image, empty until one is uploaded
    pub profile_image_url: String,

    /// Account role
    pub role: UserRole,

    /// False while email verification is pending; also forced false on
    /// soft delete
    pub is_active: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,

    /// Soft-deletion marker; a live record omits the attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl User {
    /// True once the account has been soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Strips the password hash for external consumption
    pub fn into_view(self) -> UserView {
        UserView {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            profile_image_url: self.profile_image_url,
            role: self.role,
            is_active: self.is_active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// A user record with the password hash redacted
///
/// Everything that leaves the service layer uses this shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub profile_image_url: String,
    pub role: UserRole,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        user.into_view()
    }
}

/// Input for creating a user
///
/// `password_hash` must already be hashed; `is_active` is decided by the
/// caller (inactive while verification is pending).
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: String,
    pub profile_image_url: Option<String>,
    pub role: UserRole,
    pub is_active: bool,
}

/// Input for a partial user update
///
/// Only provided fields are considered, and only fields whose value actually
/// differs from the stored record are written.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub profile_image_url: Option<String>,
    pub password_hash: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_is_lowercase() {
        assert_eq!(serde_json::to_value(UserRole::Admin).unwrap(), "admin");
        assert_eq!(
            serde_json::from_value::<UserRole>(serde_json::json!("participant")).unwrap(),
            UserRole::Participant
        );
    }

    #[test]
    fn test_live_record_omits_deleted_at() {
        let user = User {
            id: "u1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$...".into(),
            phone: "555-0100".into(),
            profile_image_url: String::new(),
            role: UserRole::Participant,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        };

        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("deleted_at").is_none());
    }

    #[test]
    fn test_view_drops_password_hash() {
        let user = User {
            id: "u1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            password_hash: "$argon2id$...".into(),
            phone: "555-0100".into(),
            profile_image_url: String::new(),
            role: UserRole::Admin,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        };

        let view = serde_json::to_value(user.into_view()).unwrap();
        assert!(view.get("password_hash").is_none());
        assert_eq!(view.get("email").unwrap(), "ada@example.com");
    }
}
