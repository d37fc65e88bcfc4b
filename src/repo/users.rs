/// User repository
///
/// Translates user operations into store operations while enforcing
/// soft-delete visibility and email uniqueness.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use eventhub::db::MemoryStore;
/// use eventhub::models::{CreateUser, UserRole};
/// use eventhub::repo::UserRepository;
///
/// # async fn example() -> eventhub::error::Result<()> {
/// let repo = UserRepository::new(Arc::new(MemoryStore::new()), "users");
/// let user = repo
///     .create(CreateUser {
///         name: "Ada".into(),
///         email: "ada@example.com".into(),
///         password_hash: "$argon2id$...".into(),
///         phone: "555-0100".into(),
///         profile_image_url: None,
///         role: UserRole::Participant,
///         is_active: true,
///     })
///     .await?;
/// assert!(repo.find_by_id(&user.id).await?.is_some());
/// # Ok(())
/// # }
/// ```
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::db::{from_item, to_item, Filter, KeyValueStore, ScanRequest, StoreError, Update};
use crate::error::{Error, Result};
use crate::models::{CreateUser, UpdateUser, User, UserRole};

use super::{scan_all, Page, PageRequest, PageToken};

/// Optional listing criteria for users
///
/// String filters are case-sensitive substring matches; the role filter is
/// exact. Absent criteria are omitted from the scan expression.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub name: Option<String>,
    pub email: Option<String>,
    pub role: Option<UserRole>,
}

/// Repository for [`User`] records
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn KeyValueStore>,
    table: String,
}

impl UserRepository {
    /// Creates a repository over the given store handle and table
    pub fn new(store: Arc<dyn KeyValueStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// Creates a user, enforcing email uniqueness among non-deleted records
    ///
    /// The uniqueness check and the write execute as one conditional put, so
    /// two concurrent creates with the same email cannot both succeed. A
    /// soft-deleted user's email is outside the uniqueness scope and may be
    /// registered again.
    ///
    /// # Errors
    ///
    /// [`Error::Conflict`] if a visible user already holds the email.
    pub async fn create(&self, data: CreateUser) -> Result<User> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            phone: data.phone,
            profile_image_url: data.profile_image_url.unwrap_or_default(),
            role: data.role,
            is_active: data.is_active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let taken = Filter::new()
            .eq("email", user.email.as_str())
            .not_exists("deleted_at");
        self.store
            .conditional_put(&self.table, to_item(&user)?, &taken)
            .await
            .map_err(|err| match err {
                StoreError::ConditionFailed(_) => Error::conflict("email already exists"),
                other => other.into(),
            })?;

        Ok(user)
    }

    /// Finds a visible (non-deleted) user by ID
    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let filter = Filter::new().eq("id", id).not_exists("deleted_at");
        let page = self
            .store
            .scan(
                ScanRequest::new(&self.table)
                    .with_filter(filter)
                    .with_limit(1),
            )
            .await?;
        page.items.into_iter().next().map(from_item).transpose().map_err(Into::into)
    }

    /// Finds a visible user by exact email
    ///
    /// Walks every store-side page; the store has no email index to lean on.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let filter = Filter::new().eq("email", email).not_exists("deleted_at");
        let items = scan_all(self.store.as_ref(), &self.table, &filter).await?;
        items.into_iter().next().map(from_item).transpose().map_err(Into::into)
    }

    /// Applies a partial update, writing only fields that actually changed
    ///
    /// Zero changed fields is a no-op: nothing is written and `updated_at`
    /// keeps its value. A changed email is re-checked for uniqueness against
    /// other visible users first; unlike `create`, that check is a separate
    /// read before the update.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the user is absent or soft-deleted,
    /// [`Error::Conflict`] if the new email is already in use.
    pub async fn update(&self, id: &str, data: UpdateUser) -> Result<()> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user \"{id}\"")))?;

        let mut update = Update::new();

        if let Some(name) = data.name {
            if name != current.name {
                update = update.set("name", name);
            }
        }
        if let Some(email) = data.email {
            if email != current.email {
                if let Some(existing) = self.find_by_email(&email).await? {
                    if existing.id != id {
                        return Err(Error::conflict("email already in use by another user"));
                    }
                }
                update = update.set("email", email);
            }
        }
        if let Some(phone) = data.phone {
            if phone != current.phone {
                update = update.set("phone", phone);
            }
        }
        if let Some(url) = data.profile_image_url {
            if url != current.profile_image_url {
                update = update.set("profile_image_url", url);
            }
        }
        if let Some(hash) = data.password_hash {
            // Hashes are salted, so a fresh hash never equals the stored one;
            // a provided password always writes.
            update = update.set("password_hash", hash);
        }

        if update.is_empty() {
            return Ok(());
        }

        update = update.set("updated_at", serde_json::to_value(Utc::now())?);
        self.store.update(&self.table, id, update).await?;
        Ok(())
    }

    /// Activates a user whose email verification was pending
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the user is absent or soft-deleted,
    /// [`Error::Validation`] if the user is already active.
    pub async fn activate(&self, id: &str) -> Result<User> {
        let mut user = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user \"{id}\"")))?;
        if user.is_active {
            return Err(Error::validation("user is already active"));
        }

        let now = Utc::now();
        let update = Update::new()
            .set("is_active", true)
            .set("updated_at", serde_json::to_value(now)?);
        self.store.update(&self.table, id, update).await?;

        user.is_active = true;
        user.updated_at = now;
        Ok(user)
    }

    /// Soft-deletes a user: stamps `deleted_at` and deactivates the account
    ///
    /// The row is never removed. Returns the record as it was before
    /// deletion so callers can still address the owner.
    pub async fn soft_delete(&self, id: &str) -> Result<User> {
        let user = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("user \"{id}\"")))?;

        let update = Update::new()
            .set("deleted_at", serde_json::to_value(Utc::now())?)
            .set("is_active", false);
        self.store.update(&self.table, id, update).await?;
        Ok(user)
    }

    /// Lists visible users matching `filter`, one page at a time
    pub async fn list(&self, filter: UserFilter, page: &PageRequest) -> Result<Page<User>> {
        let mut scan_filter = Filter::new().not_exists("deleted_at");
        if let Some(name) = filter.name {
            scan_filter = scan_filter.contains("name", name);
        }
        if let Some(email) = filter.email {
            scan_filter = scan_filter.contains("email", email);
        }
        if let Some(role) = filter.role {
            scan_filter = scan_filter.eq("role", role.as_str());
        }

        let result = self
            .store
            .scan(
                ScanRequest::new(&self.table)
                    .with_filter(scan_filter)
                    .with_limit(page.effective_limit()?)
                    .with_start_after(page.start_key()?),
            )
            .await?;

        let items = result
            .items
            .into_iter()
            .map(from_item)
            .collect::<std::result::Result<Vec<User>, _>>()?;
        Ok(Page {
            items,
            next_token: result.last_evaluated_key.as_deref().map(PageToken::encode),
        })
    }
}
