/// Object storage client
///
/// Profile and event images are uploaded ahead of the repository update;
/// the rest of the system only ever sees the returned public URL as an
/// opaque string. Any post-processing (resizing) happens out-of-band on the
/// storage side.
use async_trait::async_trait;
use bytes::Bytes;
use tracing::error;
use uuid::Uuid;

use crate::config::StorageConfig;

/// Error type for object storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The storage endpoint could not be reached
    #[error("storage request failed: {0}")]
    Transport(String),

    /// The storage endpoint rejected the upload
    #[error("storage returned status {status}")]
    Rejected { status: u16 },
}

/// Image storage seam
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Uploads an image and returns its public URL
    ///
    /// The object key is namespaced as
    /// `{path_prefix}/{owner_id}/{random}_{file_name}` so one owner's
    /// uploads never collide with another's.
    async fn upload_image(
        &self,
        data: Bytes,
        content_type: &str,
        owner_id: &str,
        path_prefix: &str,
        file_name: &str,
    ) -> Result<String, StorageError>;
}

/// S3-compatible storage speaking plain HTTP
///
/// Issues a `PUT {endpoint}/{bucket}/{key}` per upload and builds the
/// public URL from the configured base (or the endpoint itself).
pub struct S3CompatibleStorage {
    client: reqwest::Client,
    config: StorageConfig,
}

impl S3CompatibleStorage {
    /// Creates a client from its configuration
    pub fn new(config: StorageConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn object_key(owner_id: &str, path_prefix: &str, file_name: &str) -> String {
        let prefix = path_prefix.trim_end_matches('/');
        format!("{prefix}/{owner_id}/{}_{file_name}", Uuid::new_v4())
    }
}

#[async_trait]
impl ObjectStorage for S3CompatibleStorage {
    async fn upload_image(
        &self,
        data: Bytes,
        content_type: &str,
        owner_id: &str,
        path_prefix: &str,
        file_name: &str,
    ) -> Result<String, StorageError> {
        let key = Self::object_key(owner_id, path_prefix, file_name);
        let endpoint = self.config.endpoint.trim_end_matches('/');
        let upload_url = format!("{endpoint}/{}/{key}", self.config.bucket);

        let response = self
            .client
            .put(&upload_url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await
            .map_err(|e| {
                error!(target: "eventhub::storage", error = %e, "image upload failed");
                StorageError::Transport(e.to_string())
            })?;

        if !response.status().is_success() {
            return Err(StorageError::Rejected {
                status: response.status().as_u16(),
            });
        }

        let public_base = self
            .config
            .public_base_url
            .as_deref()
            .unwrap_or(endpoint)
            .trim_end_matches('/');
        Ok(format!("{public_base}/{}/{key}", self.config.bucket))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_is_namespaced_per_owner() {
        let key = S3CompatibleStorage::object_key("user-1", "profiles/", "avatar.png");
        assert!(key.starts_with("profiles/user-1/"));
        assert!(key.ends_with("_avatar.png"));

        let other = S3CompatibleStorage::object_key("user-1", "profiles", "avatar.png");
        assert!(other.starts_with("profiles/user-1/"));
        assert_ne!(key, other, "keys carry a random component");
    }
}
