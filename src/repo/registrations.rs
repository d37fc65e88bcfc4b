/// Registration repository
///
/// Registrations have no uniqueness constraint; domain rules about which
/// events may be registered for live in the service layer, which can see
/// the event repository.
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::db::{from_item, to_item, Filter, KeyValueStore, ScanRequest, Update};
use crate::error::{Error, Result};
use crate::models::{CreateRegistration, Registration};

use super::{Page, PageRequest, PageToken};

/// Repository for [`Registration`] records
#[derive(Clone)]
pub struct RegistrationRepository {
    store: Arc<dyn KeyValueStore>,
    table: String,
}

impl RegistrationRepository {
    /// Creates a repository over the given store handle and table
    pub fn new(store: Arc<dyn KeyValueStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    /// Creates a registration
    pub async fn create(&self, data: CreateRegistration) -> Result<Registration> {
        let registration = Registration {
            id: Uuid::new_v4().to_string(),
            event_id: data.event_id,
            participant_id: data.participant_id,
            created_at: Utc::now(),
            deleted_at: None,
        };
        self.store
            .put(&self.table, to_item(&registration)?)
            .await?;
        Ok(registration)
    }

    /// Finds a live (non-cancelled) registration by ID
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Registration>> {
        let filter = Filter::new().eq("id", id).not_exists("deleted_at");
        let page = self
            .store
            .scan(
                ScanRequest::new(&self.table)
                    .with_filter(filter)
                    .with_limit(1),
            )
            .await?;
        page.items
            .into_iter()
            .next()
            .map(from_item)
            .transpose()
            .map_err(Into::into)
    }

    /// Lists a participant's live registrations, one page at a time
    pub async fn list_by_participant(
        &self,
        participant_id: &str,
        page: &PageRequest,
    ) -> Result<Page<Registration>> {
        let filter = Filter::new()
            .eq("participant_id", participant_id)
            .not_exists("deleted_at");

        let result = self
            .store
            .scan(
                ScanRequest::new(&self.table)
                    .with_filter(filter)
                    .with_limit(page.effective_limit()?)
                    .with_start_after(page.start_key()?),
            )
            .await?;

        let items = result
            .items
            .into_iter()
            .map(from_item)
            .collect::<std::result::Result<Vec<Registration>, _>>()?;
        Ok(Page {
            items,
            next_token: result.last_evaluated_key.as_deref().map(PageToken::encode),
        })
    }

    /// Cancels a registration by stamping `deleted_at`
    ///
    /// Returns the record as it was before cancellation.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the registration is absent or already
    /// cancelled.
    pub async fn soft_delete(&self, id: &str) -> Result<Registration> {
        let registration = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("registration \"{id}\"")))?;

        let update = Update::new().set("deleted_at", serde_json::to_value(Utc::now())?);
        self.store.update(&self.table, id, update).await?;
        Ok(registration)
    }
}
