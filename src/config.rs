/// Configuration management
///
/// Loads configuration from environment variables (with `.env` support for
/// development) into a type-safe struct.
///
/// # Environment Variables
///
/// - `APP_URL`: public base URL used in verification links (default:
///   `http://localhost:8080`)
/// - `JWT_SECRET`: secret key for token signing (required, ≥ 32 chars)
/// - `TABLE_USERS` / `TABLE_EVENTS` / `TABLE_REGISTRATIONS`: store table
///   names (defaults: `users`, `events`, `registrations`)
/// - `MAIL_API_URL` / `MAIL_API_TOKEN` / `MAIL_FROM`: mail API; all three
///   must be present for email to be configured, otherwise notifications
///   are skipped and new accounts start active
/// - `STORAGE_ENDPOINT` / `STORAGE_BUCKET`: object storage; both must be
///   present for image uploads to be available
/// - `STORAGE_PUBLIC_BASE_URL`: optional public base for returned image URLs
///
/// # Example
///
/// ```no_run
/// use eventhub::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("users table: {}", config.tables.users);
/// # Ok(())
/// # }
/// ```
use serde::{Deserialize, Serialize};
use std::env;
use tracing::warn;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Public base URL of the application
    pub app_url: String,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Store table names
    pub tables: TableConfig,

    /// Mail API configuration; `None` when mail is not configured
    pub email: Option<EmailConfig>,

    /// Object storage configuration; `None` when uploads are unavailable
    pub storage: Option<StorageConfig>,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for token signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,
}

/// Store table names
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableConfig {
    pub users: String,
    pub events: String,
    pub registrations: String,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            users: "users".to_string(),
            events: "events".to_string(),
            registrations: "registrations".to_string(),
        }
    }
}

/// Mail API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// HTTP endpoint of the transactional mail API
    pub api_url: String,

    /// Bearer token for the mail API
    pub api_token: String,

    /// Sender address
    pub mail_from: String,
}

/// Object storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// S3-compatible endpoint
    pub endpoint: String,

    /// Bucket receiving image uploads
    pub bucket: String,

    /// Public base URL for returned image links; endpoint is used if unset
    pub public_base_url: Option<String>,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `JWT_SECRET` is missing or shorter than 32
    /// characters.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let app_url =
            env::var("APP_URL").unwrap_or_else(|_| "http://localhost:8080".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let tables = TableConfig {
            users: env::var("TABLE_USERS").unwrap_or_else(|_| "users".to_string()),
            events: env::var("TABLE_EVENTS").unwrap_or_else(|_| "events".to_string()),
            registrations: env::var("TABLE_REGISTRATIONS")
                .unwrap_or_else(|_| "registrations".to_string()),
        };

        let email = match (
            env::var("MAIL_API_URL"),
            env::var("MAIL_API_TOKEN"),
            env::var("MAIL_FROM"),
        ) {
            (Ok(api_url), Ok(api_token), Ok(mail_from)) => Some(EmailConfig {
                api_url,
                api_token,
                mail_from,
            }),
            _ => {
                warn!("mail API not fully configured, email sending will be skipped");
                None
            }
        };

        let storage = match (env::var("STORAGE_ENDPOINT"), env::var("STORAGE_BUCKET")) {
            (Ok(endpoint), Ok(bucket)) => Some(StorageConfig {
                endpoint,
                bucket,
                public_base_url: env::var("STORAGE_PUBLIC_BASE_URL").ok(),
            }),
            _ => {
                warn!("object storage not configured, image uploads will be unavailable");
                None
            }
        };

        Ok(Self {
            app_url,
            jwt: JwtConfig { secret: jwt_secret },
            tables,
            email,
            storage,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_defaults() {
        let tables = TableConfig::default();
        assert_eq!(tables.users, "users");
        assert_eq!(tables.events, "events");
        assert_eq!(tables.registrations, "registrations");
    }
}
