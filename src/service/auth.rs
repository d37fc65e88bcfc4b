/// Authentication service
///
/// Credential checking, token issuance, and the email verification flow.
/// Missing user and wrong password surface as the same error so the
/// response never reveals which one it was.
use crate::auth::tokens::{create_token, validate_token, Claims};
use crate::auth::{password, Principal};
use crate::error::{Error, Result};
use crate::models::User;
use crate::repo::UserRepository;

/// A successfully issued access token
#[derive(Debug, Clone, serde::Serialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// Service for authentication
pub struct AuthService {
    users: UserRepository,
    jwt_secret: String,
}

impl AuthService {
    pub fn new(users: UserRepository, jwt_secret: String) -> Self {
        Self { users, jwt_secret }
    }

    /// Checks an email/password pair against the stored hash
    ///
    /// # Errors
    ///
    /// [`Error::Unauthorized`] for an unknown email or a wrong password.
    pub async fn validate_credentials(&self, email: &str, plain_password: &str) -> Result<User> {
        let user = self
            .users
            .find_by_email(email)
            .await?
            .ok_or_else(|| Error::unauthorized("invalid email or password"))?;

        if !password::verify_password(plain_password, &user.password_hash)? {
            return Err(Error::unauthorized("invalid email or password"));
        }
        Ok(user)
    }

    /// Validates credentials and issues an access token
    pub async fn login(&self, email: &str, plain_password: &str) -> Result<TokenResponse> {
        let user = self.validate_credentials(email, plain_password).await?;
        let claims = Claims::new(&user.id, &user.name, &user.email, user.role);
        Ok(TokenResponse {
            access_token: create_token(&claims, &self.jwt_secret)?,
        })
    }

    /// Resolves an access token into the acting principal
    pub fn authenticate(&self, token: &str) -> Result<Principal> {
        let claims = validate_token(token, &self.jwt_secret)?;
        claims
            .principal()
            .ok_or_else(|| Error::unauthorized("token carries no role"))
    }

    /// Completes email verification; the token is the user id
    ///
    /// Idempotent: verifying an already-active account just reports so.
    ///
    /// # Errors
    ///
    /// [`Error::Unauthorized`] for a token that matches no visible user.
    pub async fn verify_email(&self, token: &str) -> Result<&'static str> {
        let user = self
            .users
            .find_by_id(token)
            .await?
            .ok_or_else(|| Error::unauthorized("invalid or expired verification token"))?;

        if user.is_active {
            return Ok("email already verified");
        }

        self.users.activate(&user.id).await?;
        Ok("email successfully verified, you can now log in")
    }
}
