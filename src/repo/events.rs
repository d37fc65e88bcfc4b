/// Event repository
///
/// Same surface as the user repository, with two twists: name uniqueness is
/// scoped to active, non-deleted events (a soft-deleted event frees its
/// name), and listings default to active events when no status filter is
/// given, so deleted/inactive events only show up when asked for
/// explicitly.
use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::db::{from_item, to_item, Filter, KeyValueStore, ScanRequest, StoreError, Update};
use crate::error::{Error, Result};
use crate::models::{CreateEvent, Event, EventStatus, UpdateEvent};

use super::{scan_all, Page, PageRequest, PageToken};

/// Optional listing criteria for events
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Substring match on the event name
    pub name: Option<String>,

    /// Inclusive lower bound on the event date
    pub date_from: Option<DateTime<Utc>>,

    /// Exact status match; `None` means active only
    pub status: Option<EventStatus>,
}

/// Repository for [`Event`] records
#[derive(Clone)]
pub struct EventRepository {
    store: Arc<dyn KeyValueStore>,
    table: String,
}

impl EventRepository {
    /// Creates a repository over the given store handle and table
    pub fn new(store: Arc<dyn KeyValueStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    fn name_taken_filter(name: &str) -> Filter {
        Filter::new()
            .eq("name", name)
            .eq("status", EventStatus::Active.as_str())
            .not_exists("deleted_at")
    }

    /// Creates an event, enforcing name uniqueness among active events
    ///
    /// Check and write execute as one conditional put.
    ///
    /// # Errors
    ///
    /// [`Error::Conflict`] if an active event already holds the name.
    pub async fn create(&self, data: CreateEvent) -> Result<Event> {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4().to_string(),
            name: data.name,
            description: data.description,
            date: data.date,
            image_url: data.image_url.unwrap_or_default(),
            organizer_id: data.organizer_id,
            status: EventStatus::Active,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let taken = Self::name_taken_filter(&event.name);
        self.store
            .conditional_put(&self.table, to_item(&event)?, &taken)
            .await
            .map_err(|err| match err {
                StoreError::ConditionFailed(_) => Error::conflict("event name already exists"),
                other => other.into(),
            })?;

        Ok(event)
    }

    /// Finds a visible (non-deleted) event by ID
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Event>> {
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

    /// Finds an active, non-deleted event by exact name
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Event>> {
        let filter = Self::name_taken_filter(name);
        let items = scan_all(self.store.as_ref(), &self.table, &filter).await?;
        items
            .into_iter()
            .next()
            .map(from_item)
            .transpose()
            .map_err(Into::into)
    }

    /// Applies a partial update, writing only fields that actually changed
    ///
    /// Zero changed fields is a no-op. A changed name is re-checked for
    /// uniqueness against other active events before the write.
    pub async fn update(&self, id: &str, data: UpdateEvent) -> Result<()> {
        let current = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("event \"{id}\"")))?;

        let mut update = Update::new();

        if let Some(name) = data.name {
            if name != current.name {
                if let Some(existing) = self.find_by_name(&name).await? {
                    if existing.id != id {
                        return Err(Error::conflict("event name already exists"));
                    }
                }
                update = update.set("name", name);
            }
        }
        if let Some(description) = data.description {
            if description != current.description {
                update = update.set("description", description);
            }
        }
        if let Some(date) = data.date {
            if date != current.date {
                update = update.set("date", serde_json::to_value(date)?);
            }
        }
        if let Some(url) = data.image_url {
            if url != current.image_url {
                update = update.set("image_url", url);
            }
        }

        if update.is_empty() {
            return Ok(());
        }

        update = update.set("updated_at", serde_json::to_value(Utc::now())?);
        self.store.update(&self.table, id, update).await?;
        Ok(())
    }

    /// Soft-deletes an event: status goes inactive and `deleted_at` is
    /// stamped; the row is never removed
    ///
    /// Returns the record as it was before deletion.
    pub async fn soft_delete(&self, id: &str) -> Result<Event> {
        let event = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("event \"{id}\"")))?;

        let update = Update::new()
            .set("status", EventStatus::Inactive.as_str())
            .set("deleted_at", serde_json::to_value(Utc::now())?);
        self.store.update(&self.table, id, update).await?;
        Ok(event)
    }

    /// Lists events matching `filter`, one page at a time
    ///
    /// With no status filter only active, non-deleted events are returned;
    /// `status = inactive` surfaces the soft-deleted/inactive ones.
    pub async fn list(&self, filter: EventFilter, page: &PageRequest) -> Result<Page<Event>> {
        let status = filter.status.unwrap_or(EventStatus::Active);
        let mut scan_filter = Filter::new().eq("status", status.as_str());
        if status == EventStatus::Active {
            scan_filter = scan_filter.not_exists("deleted_at");
        }
        if let Some(name) = filter.name {
            scan_filter = scan_filter.contains("name", name);
        }
        if let Some(date_from) = filter.date_from {
            scan_filter = scan_filter.greater_or_equal("date", serde_json::to_value(date_from)?);
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
            .collect::<std::result::Result<Vec<Event>, _>>()?;
        Ok(Page {
            items,
            next_token: result.last_evaluated_key.as_deref().map(PageToken::encode),
        })
    }
}
