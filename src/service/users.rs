/// User service
///
/// Registration is open (no principal); every other operation is gated on
/// self-or-admin. Everything returned to callers is a [`UserView`] — the
/// password hash never leaves this layer.
use std::sync::Arc;

use bytes::Bytes;
use tracing::info;

use crate::auth::{password, policy, Principal};
use crate::error::{Error, Result};
use crate::models::{CreateUser, UpdateUser, UserRole, UserView};
use crate::notify::{dispatch, Notification, Notifier};
use crate::repo::{Page, PageRequest, UserFilter, UserRepository};
use crate::storage::ObjectStorage;

/// Input for account registration
#[derive(Debug, Clone)]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    /// Plaintext password; hashed before it reaches the repository
    pub password: String,
    pub phone: String,
    pub role: UserRole,
}

/// Input for a profile update
#[derive(Debug, Clone, Default)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Plaintext password; hashed before it reaches the repository
    pub password: Option<String>,
}

/// Service for user accounts
pub struct UserService {
    repo: UserRepository,
    notifier: Option<Arc<dyn Notifier>>,
    storage: Option<Arc<dyn ObjectStorage>>,
    app_url: String,
}

impl UserService {
    pub fn new(
        repo: UserRepository,
        notifier: Option<Arc<dyn Notifier>>,
        storage: Option<Arc<dyn ObjectStorage>>,
        app_url: String,
    ) -> Self {
        Self {
            repo,
            notifier,
            storage,
            app_url,
        }
    }

    /// Registers a new account
    ///
    /// With mail configured the account starts inactive and a verification
    /// email goes out (the verification token is the user id); without it
    /// the account is active immediately.
    pub async fn register(&self, data: RegisterUser) -> Result<UserView> {
        let mail_configured = self.notifier.is_some();
        let user = self
            .repo
            .create(CreateUser {
                name: data.name,
                email: data.email,
                password_hash: password::hash_password(&data.password)?,
                phone: data.phone,
                profile_image_url: None,
                role: data.role,
                is_active: !mail_configured,
            })
            .await?;

        info!(user_id = %user.id, role = %user.role, "user registered");

        let verify_url = format!("{}/auth/verify-email?token={}", self.app_url, user.id);
        dispatch(
            self.notifier.as_ref(),
            Notification::EmailVerification {
                to: user.email.clone(),
                name: user.name.clone(),
                verify_url,
            },
        )
        .await;

        Ok(user.into_view())
    }

    /// Fetches a user record; self-or-admin only
    pub async fn get(&self, principal: &Principal, id: &str) -> Result<UserView> {
        policy::require_self_or_admin(principal, id)?;
        let user = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user \"{id}\"")))?;
        Ok(user.into_view())
    }

    /// Applies a profile update; self-or-admin only
    pub async fn update(&self, principal: &Principal, id: &str, data: UpdateProfile) -> Result<()> {
        policy::require_self_or_admin(principal, id)?;
        let password_hash = data
            .password
            .as_deref()
            .map(password::hash_password)
            .transpose()?;
        self.repo
            .update(
                id,
                UpdateUser {
                    name: data.name,
                    email: data.email,
                    phone: data.phone,
                    profile_image_url: None,
                    password_hash,
                },
            )
            .await
    }

    /// Uploads a profile image and stores its public URL; self-or-admin only
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] when object storage is not configured.
    pub async fn set_profile_image(
        &self,
        principal: &Principal,
        id: &str,
        data: Bytes,
        content_type: &str,
        file_name: &str,
    ) -> Result<String> {
        policy::require_self_or_admin(principal, id)?;
        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| Error::validation("object storage is not configured"))?;

        let url = storage
            .upload_image(data, content_type, id, "profiles", file_name)
            .await?;
        self.repo
            .update(
                id,
                UpdateUser {
                    profile_image_url: Some(url.clone()),
                    ..Default::default()
                },
            )
            .await?;
        Ok(url)
    }

    /// Soft-deletes an account and notifies the owner; self-or-admin only
    pub async fn soft_delete(&self, principal: &Principal, id: &str) -> Result<()> {
        policy::require_self_or_admin(principal, id)?;
        let user = self.repo.soft_delete(id).await?;

        info!(user_id = %user.id, "user soft-deleted");

        dispatch(
            self.notifier.as_ref(),
            Notification::AccountDeleted {
                to: user.email,
                name: user.name,
            },
        )
        .await;
        Ok(())
    }

    /// Lists users under the principal's visibility rules
    ///
    /// Admins keep their requested role filter; organizers always see only
    /// participants; other roles are denied.
    pub async fn list(
        &self,
        principal: &Principal,
        mut filter: UserFilter,
        page: &PageRequest,
    ) -> Result<Page<UserView>> {
        filter.role = policy::user_list_visibility(principal, filter.role)?;
        let users = self.repo.list(filter, page).await?;
        Ok(users.map(UserView::from))
    }
}
