/// Domain error taxonomy
///
/// Every fallible operation in the crate returns [`Error`]. The first five
/// variants are user-correctable domain outcomes; the remaining variants wrap
/// dependency failures, which propagate unmodified (no retry, and no rollback
/// of writes already committed in the same logical operation).
///
/// # Example
///
/// ```
/// use eventhub::error::Error;
///
/// let err = Error::conflict("email already exists");
/// assert_eq!(err.to_string(), "conflict: email already exists");
/// ```
use crate::auth::password::PasswordError;
use crate::auth::tokens::TokenError;
use crate::db::StoreError;
use crate::storage::StorageError;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Unified domain error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unique-key violation on create or update (email, event name)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Target record is absent or soft-deleted
    #[error("not found: {0}")]
    NotFound(String),

    /// An authorization rule denied the operation
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Credential or token verification failed
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Input violated a domain rule (past event date, zero page size, ...)
    #[error("validation: {0}")]
    Validation(String),

    /// Store call failed
    #[error("store operation failed: {0}")]
    Store(#[from] StoreError),

    /// Object storage call failed
    #[error("object storage operation failed: {0}")]
    Storage(#[from] StorageError),

    /// Token creation or validation failed
    #[error("token error: {0}")]
    Token(#[from] TokenError),

    /// Password hashing failed
    #[error("password error: {0}")]
    Password(#[from] PasswordError),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Store(StoreError::Serialization(err))
    }
}

impl Error {
    /// Builds a [`Error::Conflict`]
    pub fn conflict(msg: impl Into<String>) -> Self {
        Error::Conflict(msg.into())
    }

    /// Builds a [`Error::NotFound`]
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// Builds a [`Error::Forbidden`]
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Error::Forbidden(msg.into())
    }

    /// Builds a [`Error::Unauthorized`]
    pub fn unauthorized(msg: impl Into<String>) -> Self {
        Error::Unauthorized(msg.into())
    }

    /// Builds a [`Error::Validation`]
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// True for the user-correctable domain variants, false for dependency
    /// failures
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            Error::Conflict(_)
                | Error::NotFound(_)
                | Error::Forbidden(_)
                | Error::Unauthorized(_)
                | Error::Validation(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_prefixes() {
        assert_eq!(
            Error::not_found("user \"42\"").to_string(),
            "not found: user \"42\""
        );
        assert_eq!(
            Error::forbidden("organizers only").to_string(),
            "forbidden: organizers only"
        );
    }

    #[test]
    fn test_domain_vs_dependency() {
        assert!(Error::conflict("x").is_domain());
        assert!(Error::validation("x").is_domain());
        assert!(!Error::Store(StoreError::Backend("down".into())).is_domain());
    }
}
