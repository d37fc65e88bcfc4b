//! # EventHub Core
//!
//! Backend core of an event-management service: users register and
//! authenticate, organizers create events, participants register for them,
//! images land in object storage and transactional emails go out after the
//! fact. Persistence is a schemaless key-value store queried by
//! predicate-filtered scans — correctness never depends on an index.
//!
//! ## Module Organization
//!
//! - `models`: entity types (users, events, registrations)
//! - `db`: the key-value store seam, expression builders, in-memory backend
//! - `repo`: entity repositories (soft delete, uniqueness, pagination)
//! - `auth`: principal, authorization rules, password hashing, tokens
//! - `service`: operation boundary composing authorization → repository →
//!   notification
//! - `notify`: best-effort transactional email dispatch
//! - `storage`: object storage client for profile/event images
//! - `config`: environment-driven configuration
//! - `error`: domain error taxonomy
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use eventhub::db::MemoryStore;
//! use eventhub::repo::UserRepository;
//! use eventhub::models::{CreateUser, UserRole};
//!
//! # async fn example() -> eventhub::error::Result<()> {
//! let store = Arc::new(MemoryStore::new());
//! let users = UserRepository::new(store, "users");
//!
//! let user = users
//!     .create(CreateUser {
//!         name: "Ada".into(),
//!         email: "ada@example.com".into(),
//!         password_hash: "$argon2id$...".into(),
//!         phone: "555-0100".into(),
//!         profile_image_url: None,
//!         role: UserRole::Organizer,
//!         is_active: true,
//!     })
//!     .await?;
//!
//! users.soft_delete(&user.id).await?;
//! assert!(users.find_by_id(&user.id).await?.is_none());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod notify;
pub mod repo;
pub mod service;
pub mod storage;

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
