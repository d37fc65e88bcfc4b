/// Entity models
///
/// Plain data types persisted through the repositories in [`crate::repo`].
/// Entities never hold live references to one another — relations are by
/// identifier lookup only (`Event::organizer_id`,
/// `Registration::event_id`/`participant_id`).
///
/// All three entities soft-delete: `deleted_at` is set instead of removing
/// the row, and a live record omits the attribute entirely so visibility
/// checks can use an attribute-absence predicate.
pub mod event;
pub mod registration;
pub mod user;

pub use event::{CreateEvent, Event, EventStatus, UpdateEvent};
pub use registration::{CreateRegistration, Registration};
pub use user::{CreateUser, UpdateUser, User, UserRole, UserView};
