/// Access-token issuance and validation
///
/// Tokens are HS256-signed JWTs carrying the user's identity and roles.
/// Validation checks the signature, expiration and issuer.
///
/// # Example
///
/// ```
/// use eventhub::auth::tokens::{create_token, validate_token, Claims};
/// use eventhub::models::UserRole;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "a-secret-key-of-at-least-32-bytes!!";
/// let claims = Claims::new("user-1", "Ada", "ada@example.com", UserRole::Organizer);
/// let token = create_token(&claims, secret)?;
///
/// let validated = validate_token(&token, secret)?;
/// assert_eq!(validated.sub, "user-1");
/// assert_eq!(validated.roles, vec![UserRole::Organizer]);
/// # Ok(())
/// # }
/// ```
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::auth::Principal;
use crate::models::UserRole;

/// Issuer claim stamped on every token
pub const ISSUER: &str = "eventhub";

/// Access-token lifetime
pub const ACCESS_TOKEN_TTL_HOURS: i64 = 24;

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to create token
    #[error("failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("token has expired")]
    Expired,

    /// Token was issued by someone else
    #[error("invalid issuer: expected {ISSUER}")]
    InvalidIssuer,
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject — user ID
    pub sub: String,

    /// Issuer, always [`ISSUER`]
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Display name of the user
    pub name: String,

    /// Email of the user
    pub email: String,

    /// Roles held by the user
    pub roles: Vec<UserRole>,
}

impl Claims {
    /// Creates claims with the default 24-hour expiration
    pub fn new(
        user_id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        role: UserRole,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id.into(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(ACCESS_TOKEN_TTL_HOURS)).timestamp(),
            name: name.into(),
            email: email.into(),
            roles: vec![role],
        }
    }

    /// True once the token's expiration has passed
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }

    /// Principal carried by these claims
    ///
    /// The first role wins; tokens issued by this crate carry exactly one.
    pub fn principal(&self) -> Option<Principal> {
        self.roles
            .first()
            .map(|role| Principal::new(self.sub.clone(), *role))
    }
}

/// Signs claims into a token string
///
/// # Errors
///
/// Returns [`TokenError::CreateError`] if encoding fails.
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, TokenError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| TokenError::CreateError(format!("token encoding failed: {e}")))
}

/// Validates a token and extracts its claims
///
/// Verifies the signature, expiration and issuer.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, TokenError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
        _ => TokenError::ValidationError(format!("token validation failed: {e}")),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-of-at-least-32-bytes";

    #[test]
    fn test_round_trip() {
        let claims = Claims::new("u1", "Ada", "ada@example.com", UserRole::Admin);
        let token = create_token(&claims, SECRET).unwrap();

        let validated = validate_token(&token, SECRET).unwrap();
        assert_eq!(validated.sub, "u1");
        assert_eq!(validated.email, "ada@example.com");
        assert_eq!(validated.roles, vec![UserRole::Admin]);
        assert!(!validated.is_expired());

        let principal = validated.principal().unwrap();
        assert_eq!(principal.id, "u1");
        assert_eq!(principal.role, UserRole::Admin);
    }

    #[test]
    fn test_wrong_secret_fails() {
        let claims = Claims::new("u1", "Ada", "ada@example.com", UserRole::Participant);
        let token = create_token(&claims, SECRET).unwrap();
        assert!(validate_token(&token, "another-secret-key-of-32-bytes!!").is_err());
    }

    #[test]
    fn test_expired_token_fails() {
        let mut claims = Claims::new("u1", "Ada", "ada@example.com", UserRole::Participant);
        claims.iat -= 100_000;
        claims.exp = claims.iat + 1;
        let token = create_token(&claims, SECRET).unwrap();
        assert!(matches!(
            validate_token(&token, SECRET),
            Err(TokenError::Expired)
        ));
    }

    #[test]
    fn test_foreign_issuer_fails() {
        let mut claims = Claims::new("u1", "Ada", "ada@example.com", UserRole::Participant);
        claims.iss = "someone-else".to_string();
        let token = create_token(&claims, SECRET).unwrap();
        assert!(validate_token(&token, SECRET).is_err());
    }
}
