/// Registration model
///
/// Links a participant to an event. Cancelling a registration is a soft
/// delete, so a cancelled row stays queryable by tooling but disappears from
/// listings.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registration record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    /// Unique registration ID (UUID v4, stored as a string)
    pub id: String,

    /// Target event
    pub event_id: String,

    /// Registering participant; only this user may cancel
    pub participant_id: String,

    pub created_at: DateTime<Utc>,

    /// Cancellation marker; a live registration omits the attribute
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Registration {
    /// True once the registration has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Input for creating a registration
#[derive(Debug, Clone)]
pub struct CreateRegistration {
    pub event_id: String,
    pub participant_id: String,
}
