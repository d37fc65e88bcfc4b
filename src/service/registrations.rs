/// Registration service
///
/// The domain rules live here because they span entities: a registration is
/// only permitted against an active event whose date is in the future, and
/// only the registering participant may cancel.
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::auth::{policy, Principal};
use crate::error::{Error, Result};
use crate::models::{CreateRegistration, EventStatus, Registration};
use crate::notify::{dispatch, Notification, Notifier};
use crate::repo::{EventRepository, Page, PageRequest, RegistrationRepository, UserRepository};

/// Service for event registrations
pub struct RegistrationService {
    repo: RegistrationRepository,
    events: EventRepository,
    users: UserRepository,
    notifier: Option<Arc<dyn Notifier>>,
}

impl RegistrationService {
    pub fn new(
        repo: RegistrationRepository,
        events: EventRepository,
        users: UserRepository,
        notifier: Option<Arc<dyn Notifier>>,
    ) -> Self {
        Self {
            repo,
            events,
            users,
            notifier,
        }
    }

    /// Registers the principal for an event; participant or organizer only
    ///
    /// # Errors
    ///
    /// [`Error::Validation`] if the event is missing, inactive or already
    /// in the past.
    pub async fn register(&self, principal: &Principal, event_id: &str) -> Result<Registration> {
        policy::require_registrant(principal)?;

        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .filter(|e| e.status != EventStatus::Inactive)
            .ok_or_else(|| Error::validation("invalid or inactive event"))?;
        if event.date <= Utc::now() {
            return Err(Error::validation("event has already occurred"));
        }

        let registration = self
            .repo
            .create(CreateRegistration {
                event_id: event.id.clone(),
                participant_id: principal.id.clone(),
            })
            .await?;

        info!(
            registration_id = %registration.id,
            event_id = %event.id,
            participant_id = %principal.id,
            "registration created"
        );

        if let Some(user) = self.users.find_by_id(&principal.id).await? {
            dispatch(
                self.notifier.as_ref(),
                Notification::RegistrationConfirmed {
                    to: user.email,
                    event_name: event.name,
                    event_date: event.date,
                },
            )
            .await;
        }

        Ok(registration)
    }

    /// Cancels a registration; only the registering participant may
    pub async fn cancel(&self, principal: &Principal, id: &str) -> Result<()> {
        let registration = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| Error::not_found(format!("registration \"{id}\"")))?;
        policy::require_registration_owner(principal, &registration)?;

        let registration = self.repo.soft_delete(id).await?;

        info!(registration_id = %id, "registration cancelled");

        if let Some(user) = self.users.find_by_id(&registration.participant_id).await? {
            // the event may itself be gone by now; fall back to its id
            let event_name = self
                .events
                .find_by_id(&registration.event_id)
                .await?
                .map(|e| e.name)
                .unwrap_or_else(|| registration.event_id.clone());
            dispatch(
                self.notifier.as_ref(),
                Notification::RegistrationCancelled {
                    to: user.email,
                    event_name,
                },
            )
            .await;
        }

        Ok(())
    }

    /// Lists the principal's own live registrations
    pub async fn list_own(
        &self,
        principal: &Principal,
        page: &PageRequest,
    ) -> Result<Page<Registration>> {
        self.repo.list_by_participant(&principal.id, page).await
    }
}
