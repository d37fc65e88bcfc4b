/// Event model
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of an event
///
/// Soft deletion flips the status to `Inactive` in addition to stamping
/// `deleted_at`, and name uniqueness only applies to active events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Active,
    Inactive,
}

impl EventStatus {
    /// Status as its stored string form
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Active => "active",
            EventStatus::Inactive => "inactive",
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event record
///
/// Owned by the organizer referenced in `organizer_id`; only that organizer
/// or an admin may mutate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event ID (UUID v4, stored as a string)
    pub id: String,

    /// Event name; unique among active, non-deleted events
    pub name: String,

    /// Free-form description
    pub description: String,

    /// When the event takes place; registrations require this to be in the
    /// future
    pub date: DateTime<Utc>,

    /// Public URL of the event image, empty until one is uploaded
    pub image_url: String,

    /// ID of the owning organizer
    pub organizer_id: String,

    /// Lifecycle status
    pub status: EventStatus,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Soft-deletion marker; a live record omits the attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Event {
    /// True once the event has been soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// True if the event can accept registrations at `now`
    pub fn accepts_registrations(&self, now: DateTime<Utc>) -> bool {
        self.status == EventStatus::Active && !self.is_deleted() && self.date > now
    }
}

/// Input for creating an event
#[derive(Debug, Clone)]
pub struct CreateEvent {
    pub name: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub image_url: Option<String>,
    pub organizer_id: String,
}

/// Input for a partial event update
#[derive(Debug, Clone, Default)]
pub struct UpdateEvent {
    pub name: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn event(status: EventStatus, date: DateTime<Utc>) -> Event {
        Event {
            id: "e1".into(),
            name: "meetup".into(),
            description: String::new(),
            date,
            image_url: String::new(),
            organizer_id: "u1".into(),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[test]
    fn test_accepts_registrations() {
        let now = Utc::now();
        assert!(event(EventStatus::Active, now + Duration::days(1)).accepts_registrations(now));
        assert!(!event(EventStatus::Inactive, now + Duration::days(1)).accepts_registrations(now));
        assert!(!event(EventStatus::Active, now - Duration::days(1)).accepts_registrations(now));

        let mut deleted = event(EventStatus::Active, now + Duration::days(1));
        deleted.deleted_at = Some(now);
        assert!(!deleted.accepts_registrations(now));
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_value(EventStatus::Inactive).unwrap(),
            "inactive"
        );
    }
}
