/// Integration tests for the service layer
///
/// These exercise the full operation path — authorization rules, repository
/// semantics, and the best-effort notifications observed through the
/// recording doubles.
mod common;

use bytes::Bytes;
use chrono::{Duration, Utc};

use common::{TestContext, PASSWORD};
use eventhub::error::Error;
use eventhub::models::{EventStatus, UpdateEvent, UserRole};
use eventhub::notify::Notification;
use eventhub::repo::{EventFilter, PageRequest, UserFilter};
use eventhub::service::{CreateEventInput, RegisterUser, UpdateProfile};

fn future_event(name: &str) -> CreateEventInput {
    CreateEventInput {
        name: name.to_string(),
        description: "a gathering".to_string(),
        date: Utc::now() + Duration::days(30),
        image_url: None,
        organizer_id: None,
    }
}

#[tokio::test]
async fn test_register_verify_login_round_trip() {
    let ctx = TestContext::new();

    let view = ctx
        .app
        .users
        .register(RegisterUser {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: PASSWORD.to_string(),
            phone: "555-0100".to_string(),
            role: UserRole::Organizer,
        })
        .await
        .unwrap();

    // mail is configured, so the account starts inactive and a
    // verification email went out
    assert!(!view.is_active);
    let sent = ctx.sent();
    assert_eq!(sent.len(), 1);
    match &sent[0] {
        Notification::EmailVerification { to, verify_url, .. } => {
            assert_eq!(to, "ada@example.com");
            assert!(verify_url.contains(&format!("token={}", view.id)));
        }
        other => panic!("expected a verification email, got {other:?}"),
    }

    // logging in works even before verification, as does verifying twice
    let message = ctx.app.auth.verify_email(&view.id).await.unwrap();
    assert!(message.contains("verified"));
    assert_eq!(
        ctx.app.auth.verify_email(&view.id).await.unwrap(),
        "email already verified"
    );

    let token = ctx
        .app
        .auth
        .login("ada@example.com", PASSWORD)
        .await
        .unwrap();
    let principal = ctx.app.auth.authenticate(&token.access_token).unwrap();
    assert_eq!(principal.id, view.id);
    assert_eq!(principal.role, UserRole::Organizer);

    // wrong password and unknown email both read as unauthorized
    assert!(matches!(
        ctx.app.auth.login("ada@example.com", "nope").await.unwrap_err(),
        Error::Unauthorized(_)
    ));
    assert!(matches!(
        ctx.app.auth.login("ghost@example.com", PASSWORD).await.unwrap_err(),
        Error::Unauthorized(_)
    ));
}

#[tokio::test]
async fn test_register_without_mail_is_active_immediately() {
    let ctx = TestContext::without_collaborators();

    let view = ctx
        .app
        .users
        .register(RegisterUser {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            password: PASSWORD.to_string(),
            phone: "555-0100".to_string(),
            role: UserRole::Participant,
        })
        .await
        .unwrap();
    assert!(view.is_active);
}

#[tokio::test]
async fn test_profile_access_is_self_or_admin() {
    let ctx = TestContext::new();
    let ada = ctx.seed_user("Ada", "ada@example.com", UserRole::Participant).await;
    let bob = ctx.seed_user("Bob", "bob@example.com", UserRole::Participant).await;
    let admin = ctx.seed_user("Root", "root@example.com", UserRole::Admin).await;

    assert!(ctx.app.users.get(&ada, &ada.id).await.is_ok());
    assert!(matches!(
        ctx.app.users.get(&bob, &ada.id).await.unwrap_err(),
        Error::Forbidden(_)
    ));
    assert!(ctx.app.users.get(&admin, &ada.id).await.is_ok());

    let rename = UpdateProfile {
        name: Some("Ada L.".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        ctx.app.users.update(&bob, &ada.id, rename.clone()).await.unwrap_err(),
        Error::Forbidden(_)
    ));
    ctx.app.users.update(&ada, &ada.id, rename).await.unwrap();
    assert_eq!(ctx.app.users.get(&ada, &ada.id).await.unwrap().name, "Ada L.");
}

#[tokio::test]
async fn test_account_deletion_notifies_the_owner() {
    let ctx = TestContext::new();
    let ada = ctx.seed_user("Ada", "ada@example.com", UserRole::Participant).await;
    ctx.clear_sent();

    ctx.app.users.soft_delete(&ada, &ada.id).await.unwrap();

    let sent = ctx.sent();
    assert_eq!(sent.len(), 1);
    assert!(matches!(
        &sent[0],
        Notification::AccountDeleted { to, .. } if to == "ada@example.com"
    ));

    // the row is never physically removed
    assert_eq!(ctx.store.len("users").await, 1);

    // the account is gone from normal reads, even for an admin
    let admin = ctx.seed_user("Root", "root@example.com", UserRole::Admin).await;
    assert!(matches!(
        ctx.app.users.get(&admin, &ada.id).await.unwrap_err(),
        Error::NotFound(_)
    ));
}

#[tokio::test]
async fn test_user_listing_visibility_rules() {
    let ctx = TestContext::new();
    let admin = ctx.seed_user("Root", "root@example.com", UserRole::Admin).await;
    let organizer = ctx.seed_user("Org", "org@example.com", UserRole::Organizer).await;
    let participant = ctx.seed_user("Ada", "ada@example.com", UserRole::Participant).await;
    ctx.seed_user("Bob", "bob@example.com", UserRole::Participant).await;

    // an organizer listing with an admin role filter still only sees
    // participants
    let page = ctx
        .app
        .users
        .list(
            &organizer,
            UserFilter {
                role: Some(UserRole::Admin),
                ..Default::default()
            },
            &PageRequest::first(),
        )
        .await
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert!(page.items.iter().all(|u| u.role == UserRole::Participant));

    // an admin keeps the requested filter
    let page = ctx
        .app
        .users
        .list(
            &admin,
            UserFilter {
                role: Some(UserRole::Organizer),
                ..Default::default()
            },
            &PageRequest::first(),
        )
        .await
        .unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, organizer.id);

    // and with no filter sees everyone
    let page = ctx
        .app
        .users
        .list(&admin, UserFilter::default(), &PageRequest::first())
        .await
        .unwrap();
    assert_eq!(page.items.len(), 4);

    // participants may not list at all
    assert!(matches!(
        ctx.app
            .users
            .list(&participant, UserFilter::default(), &PageRequest::first())
            .await
            .unwrap_err(),
        Error::Forbidden(_)
    ));
}

#[tokio::test]
async fn test_event_mutation_authorization() {
    let ctx = TestContext::new();
    let organizer = ctx.seed_user("Org", "org@example.com", UserRole::Organizer).await;
    let rival = ctx.seed_user("Rival", "rival@example.com", UserRole::Organizer).await;
    let participant = ctx.seed_user("Ada", "ada@example.com", UserRole::Participant).await;
    let admin = ctx.seed_user("Root", "root@example.com", UserRole::Admin).await;

    // participants may not create events
    assert!(matches!(
        ctx.app
            .events
            .create(&participant, future_event("Meetup"))
            .await
            .unwrap_err(),
        Error::Forbidden(_)
    ));

    let event = ctx
        .app
        .events
        .create(&organizer, future_event("Meetup"))
        .await
        .unwrap();
    assert_eq!(event.organizer_id, organizer.id);
    assert_eq!(event.status, EventStatus::Active);

    // a different organizer may not touch it, the owner and an admin may
    let rename = UpdateEvent {
        name: Some("Renamed Meetup".to_string()),
        ..Default::default()
    };
    assert!(matches!(
        ctx.app.events.update(&rival, &event.id, rename.clone()).await.unwrap_err(),
        Error::Forbidden(_)
    ));
    ctx.app.events.update(&organizer, &event.id, rename).await.unwrap();
    ctx.app
        .events
        .update(
            &admin,
            &event.id,
            UpdateEvent {
                description: Some("admin-curated".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(matches!(
        ctx.app.events.soft_delete(&rival, &event.id).await.unwrap_err(),
        Error::Forbidden(_)
    ));
    ctx.app.events.soft_delete(&admin, &event.id).await.unwrap();
    assert!(matches!(
        ctx.app.events.get(&event.id).await.unwrap_err(),
        Error::NotFound(_)
    ));
}

#[tokio::test]
async fn test_only_admins_create_events_for_others() {
    let ctx = TestContext::new();
    let organizer = ctx.seed_user("Org", "org@example.com", UserRole::Organizer).await;
    let rival = ctx.seed_user("Rival", "rival@example.com", UserRole::Organizer).await;
    let admin = ctx.seed_user("Root", "root@example.com", UserRole::Admin).await;

    let mut input = future_event("Delegated");
    input.organizer_id = Some(organizer.id.clone());
    assert!(matches!(
        ctx.app.events.create(&rival, input.clone()).await.unwrap_err(),
        Error::Forbidden(_)
    ));

    let event = ctx.app.events.create(&admin, input).await.unwrap();
    assert_eq!(event.organizer_id, organizer.id);
}

#[tokio::test]
async fn test_registration_rules_and_notifications() {
    let ctx = TestContext::new();
    let organizer = ctx.seed_user("Org", "org@example.com", UserRole::Organizer).await;
    let ada = ctx.seed_user("Ada", "ada@example.com", UserRole::Participant).await;
    let admin = ctx.seed_user("Root", "root@example.com", UserRole::Admin).await;

    let upcoming = ctx
        .app
        .events
        .create(&organizer, future_event("Upcoming"))
        .await
        .unwrap();
    let past = ctx
        .app
        .events
        .create(
            &organizer,
            CreateEventInput {
                date: Utc::now() - Duration::days(1),
                ..future_event("Already Happened")
            },
        )
        .await
        .unwrap();
    let retired = ctx
        .app
        .events
        .create(&organizer, future_event("Retired"))
        .await
        .unwrap();
    ctx.app
        .events
        .soft_delete(&organizer, &retired.id)
        .await
        .unwrap();
    ctx.clear_sent();

    // admins hold no registrant role
    assert!(matches!(
        ctx.app.registrations.register(&admin, &upcoming.id).await.unwrap_err(),
        Error::Forbidden(_)
    ));

    // past and retired events refuse registrations
    assert!(matches!(
        ctx.app.registrations.register(&ada, &past.id).await.unwrap_err(),
        Error::Validation(_)
    ));
    assert!(matches!(
        ctx.app.registrations.register(&ada, &retired.id).await.unwrap_err(),
        Error::Validation(_)
    ));

    let registration = ctx
        .app
        .registrations
        .register(&ada, &upcoming.id)
        .await
        .unwrap();
    assert_eq!(registration.participant_id, ada.id);

    let sent = ctx.sent();
    assert_eq!(sent.len(), 1);
    assert!(matches!(
        &sent[0],
        Notification::RegistrationConfirmed { to, event_name, .. }
            if to == "ada@example.com" && event_name == "Upcoming"
    ));
}

#[tokio::test]
async fn test_cancellation_is_owner_only() {
    let ctx = TestContext::new();
    let organizer = ctx.seed_user("Org", "org@example.com", UserRole::Organizer).await;
    let ada = ctx.seed_user("Ada", "ada@example.com", UserRole::Participant).await;
    let bob = ctx.seed_user("Bob", "bob@example.com", UserRole::Participant).await;

    let event = ctx
        .app
        .events
        .create(&organizer, future_event("Meetup"))
        .await
        .unwrap();
    let registration = ctx
        .app
        .registrations
        .register(&ada, &event.id)
        .await
        .unwrap();
    ctx.clear_sent();

    assert!(matches!(
        ctx.app
            .registrations
            .cancel(&bob, &registration.id)
            .await
            .unwrap_err(),
        Error::Forbidden(_)
    ));

    ctx.app
        .registrations
        .cancel(&ada, &registration.id)
        .await
        .unwrap();

    let sent = ctx.sent();
    assert_eq!(sent.len(), 1);
    assert!(matches!(
        &sent[0],
        Notification::RegistrationCancelled { to, event_name }
            if to == "ada@example.com" && event_name == "Meetup"
    ));

    // cancelled registrations leave the participant's listing
    let page = ctx
        .app
        .registrations
        .list_own(&ada, &PageRequest::first())
        .await
        .unwrap();
    assert!(page.items.is_empty());

    // cancelling twice reports not-found
    assert!(matches!(
        ctx.app
            .registrations
            .cancel(&ada, &registration.id)
            .await
            .unwrap_err(),
        Error::NotFound(_)
    ));
}

#[tokio::test]
async fn test_profile_image_upload() {
    let ctx = TestContext::new();
    let ada = ctx.seed_user("Ada", "ada@example.com", UserRole::Participant).await;

    let url = ctx
        .app
        .users
        .set_profile_image(
            &ada,
            &ada.id,
            Bytes::from_static(b"png-bytes"),
            "image/png",
            "avatar.png",
        )
        .await
        .unwrap();
    assert!(url.contains(&ada.id));
    assert_eq!(ctx.storage.uploads.lock().unwrap().len(), 1);

    let view = ctx.app.users.get(&ada, &ada.id).await.unwrap();
    assert_eq!(view.profile_image_url, url);
}

#[tokio::test]
async fn test_image_upload_requires_storage() {
    let ctx = TestContext::without_collaborators();
    let ada = ctx.seed_user("Ada", "ada@example.com", UserRole::Participant).await;

    let err = ctx
        .app
        .users
        .set_profile_image(
            &ada,
            &ada.id,
            Bytes::from_static(b"png-bytes"),
            "image/png",
            "avatar.png",
        )
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[tokio::test]
async fn test_event_listing_through_the_service() {
    let ctx = TestContext::new();
    let organizer = ctx.seed_user("Org", "org@example.com", UserRole::Organizer).await;

    for i in 0..3 {
        ctx.app
            .events
            .create(&organizer, future_event(&format!("Event {i}")))
            .await
            .unwrap();
    }

    let page = ctx
        .app
        .events
        .list(EventFilter::default(), &PageRequest::first())
        .await
        .unwrap();
    assert_eq!(page.items.len(), 3);
    assert!(page.next_token.is_none());
}
