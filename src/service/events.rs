/// Event service
use std::sync::Arc;

use bytes::Bytes;
use tracing::info;

use crate::auth::{policy, Principal};
use crate::error::{Error, Result};
use crate::models::{CreateEvent, Event, UpdateEvent};
use crate::repo::{EventFilter, EventRepository, Page, PageRequest};
use crate::storage::ObjectStorage;

/// Input for creating an event
#[derive(Debug, Clone)]
pub struct CreateEventInput {
    pub name: String,
    pub description: String,
    pub date: chrono::DateTime<chrono::Utc>,
    pub image_url: Option<String>,

    /// Owning organizer; defaults to the acting principal. Only an admin
    /// may create an event on another organizer's behalf.
    pub organizer_id: Option<String>,
}

/// Service for events
pub struct EventService {
    repo: EventRepository,
    storage: Option<Arc<dyn ObjectStorage>>,
}

impl EventService {
    pub fn new(repo: EventRepository, storage: Option<Arc<dyn ObjectStorage>>) -> Self {
        Self { repo, storage }
    }

    /// Creates an event; organizer or admin only
    pub async fn create(&self, principal: &Principal, input: CreateEventInput) -> Result<Event> {
        policy::require_event_manager(principal)?;

        let organizer_id = input.organizer_id.unwrap_or_else(|| principal.id.clone());
        if organizer_id != principal.id && !principal.role.is_admin() {
            return Err(Error::forbidden(
                "only admins may create events for another organizer",
            ));
        }

        let event = self
            .repo
            .create(CreateEvent {
                name: input.name,
                description: input.description,
                date: input.date,
                image_url: input.image_url,
                organizer_id,
            })
            .await?;

        info!(event_id = %event.id, organizer_id = %event.organizer_id, "event created");
        Ok(event)
    }

    /// Fetches a visible event
    pub async fn get(&self, id: &str) -> Result<Event> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("event \"{id}\"")))
    }

    /// Applies a partial update; owning organizer or admin only
    pub async fn update(&self, principal: &Principal, id: &str, data: UpdateEvent) -> Result<()> {
        let event = self.get(id).await?;
        policy::require_event_owner_or_admin(principal, &event)?;
        self.repo.update(id, data).await
    }

    /// Uploads an event image and stores its public URL; owning organizer
    /// or admin only
    pub async fn set_image(
        &self,
        principal: &Principal,
        id: &str,
        data: Bytes,
        content_type: &str,
        file_name: &str,
    ) -> Result<String> {
        let event = self.get(id).await?;
        policy::require_event_owner_or_admin(principal, &event)?;

        let storage = self
            .storage
            .as_ref()
            .ok_or_else(|| Error::validation("object storage is not configured"))?;

        let url = storage
            .upload_image(data, content_type, id, "events", file_name)
            .await?;
        self.repo
            .update(
                id,
                UpdateEvent {
                    image_url: Some(url.clone()),
                    ..Default::default()
                },
            )
            .await?;
        Ok(url)
    }

    /// Soft-deletes an event; owning organizer or admin only
    pub async fn soft_delete(&self, principal: &Principal, id: &str) -> Result<()> {
        let event = self.get(id).await?;
        policy::require_event_owner_or_admin(principal, &event)?;
        self.repo.soft_delete(id).await?;

        info!(event_id = %id, "event soft-deleted");
        Ok(())
    }

    /// Lists events; open to any caller, defaults to active events
    pub async fn list(&self, filter: EventFilter, page: &PageRequest) -> Result<Page<Event>> {
        self.repo.list(filter, page).await
    }
}
