/// Authorization rule evaluator
///
/// Each rule is a pure function of `(principal, target, operation)` deciding
/// allow or deny. Deny always surfaces as [`Error::Forbidden`] — never a
/// silent no-op. The rules are evaluated per operation rather than through a
/// generic policy engine, and none of them touch the store.
///
/// # Rules
///
/// - A user may read/update/delete only their own record, unless admin.
/// - An event may be updated/deleted by its organizer or an admin.
/// - A registration may be cancelled only by the participant who created it.
/// - Listing users: admin sees all roles (optionally filtered); an organizer
///   is restricted to participant-role users; participants may not list.
/// - Creating/updating events requires the organizer or admin role.
/// - Creating registrations requires the participant or organizer role.
///
/// # Example
///
/// ```
/// use eventhub::auth::policy;
/// use eventhub::auth::Principal;
/// use eventhub::models::UserRole;
///
/// let admin = Principal::new("a1", UserRole::Admin);
/// let participant = Principal::new("p1", UserRole::Participant);
///
/// assert!(policy::require_self_or_admin(&admin, "someone-else").is_ok());
/// assert!(policy::require_self_or_admin(&participant, "someone-else").is_err());
/// assert!(policy::require_self_or_admin(&participant, "p1").is_ok());
/// ```
use crate::error::{Error, Result};
use crate::models::{Event, Registration, UserRole};

use super::Principal;

/// The principal must be the target user or an admin
pub fn require_self_or_admin(principal: &Principal, target_user_id: &str) -> Result<()> {
    if principal.role.is_admin() || principal.is_self(target_user_id) {
        return Ok(());
    }
    Err(Error::forbidden("only the account owner or an admin may do this"))
}

/// The principal must hold a role allowed to create or update events
pub fn require_event_manager(principal: &Principal) -> Result<()> {
    if principal.role.can_manage_events() {
        return Ok(());
    }
    Err(Error::forbidden("only organizers and admins may manage events"))
}

/// The principal must be the event's organizer or an admin
pub fn require_event_owner_or_admin(principal: &Principal, event: &Event) -> Result<()> {
    if principal.role.is_admin() || principal.is_self(&event.organizer_id) {
        return Ok(());
    }
    Err(Error::forbidden("only the owning organizer or an admin may modify this event"))
}

/// The principal must hold a role allowed to register for events
pub fn require_registrant(principal: &Principal) -> Result<()> {
    if principal.role.can_register() {
        return Ok(());
    }
    Err(Error::forbidden("this role may not register for events"))
}

/// The principal must be the participant who created the registration
pub fn require_registration_owner(
    principal: &Principal,
    registration: &Registration,
) -> Result<()> {
    if principal.is_self(&registration.participant_id) {
        return Ok(());
    }
    Err(Error::forbidden("only the registering participant may cancel"))
}

/// Resolves the role filter a principal's user listing is allowed to use
///
/// Admins list any role and keep their requested filter. Organizers only
/// ever see participants — a requested filter is overridden, not an error.
/// Any other role is denied outright.
pub fn user_list_visibility(
    principal: &Principal,
    requested: Option<UserRole>,
) -> Result<Option<UserRole>> {
    match principal.role {
        UserRole::Admin => Ok(requested),
        UserRole::Organizer => Ok(Some(UserRole::Participant)),
        UserRole::Participant => Err(Error::forbidden("this role may not list users")),
    }
}
