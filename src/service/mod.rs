/// Entity services
///
/// Services are the operation boundary of the crate: every call takes the
/// acting [`Principal`](crate::auth::Principal) (where one is required),
/// runs the authorization rules, performs the repository operation and then
/// dispatches any follow-up notification best-effort. Controllers sit
/// directly on top of these.
use std::sync::Arc;

use crate::config::Config;
use crate::db::KeyValueStore;
use crate::notify::{HttpMailer, Notifier};
use crate::repo::{EventRepository, RegistrationRepository, UserRepository};
use crate::storage::{ObjectStorage, S3CompatibleStorage};

pub mod auth;
pub mod events;
pub mod registrations;
pub mod users;

pub use auth::{AuthService, TokenResponse};
pub use events::{CreateEventInput, EventService};
pub use registrations::RegistrationService;
pub use users::{RegisterUser, UpdateProfile, UserService};

/// All services wired over one store handle
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use eventhub::config::Config;
/// use eventhub::db::MemoryStore;
/// use eventhub::service::App;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let app = App::new(&config, Arc::new(MemoryStore::new()));
/// let _ = &app.users;
/// # Ok(())
/// # }
/// ```
pub struct App {
    pub auth: AuthService,
    pub users: UserService,
    pub events: EventService,
    pub registrations: RegistrationService,
}

impl App {
    /// Wires services with collaborators built from the configuration
    pub fn new(config: &Config, store: Arc<dyn KeyValueStore>) -> Self {
        let notifier: Option<Arc<dyn Notifier>> = config
            .email
            .clone()
            .map(|email| Arc::new(HttpMailer::new(email)) as Arc<dyn Notifier>);
        let storage: Option<Arc<dyn ObjectStorage>> = config
            .storage
            .clone()
            .map(|cfg| Arc::new(S3CompatibleStorage::new(cfg)) as Arc<dyn ObjectStorage>);
        Self::with_collaborators(config, store, notifier, storage)
    }

    /// Wires services with explicit collaborators (tests inject recorders
    /// here)
    pub fn with_collaborators(
        config: &Config,
        store: Arc<dyn KeyValueStore>,
        notifier: Option<Arc<dyn Notifier>>,
        storage: Option<Arc<dyn ObjectStorage>>,
    ) -> Self {
        let users_repo = UserRepository::new(store.clone(), config.tables.users.clone());
        let events_repo = EventRepository::new(store.clone(), config.tables.events.clone());
        let registrations_repo =
            RegistrationRepository::new(store, config.tables.registrations.clone());

        Self {
            auth: AuthService::new(users_repo.clone(), config.jwt.secret.clone()),
            users: UserService::new(
                users_repo.clone(),
                notifier.clone(),
                storage.clone(),
                config.app_url.clone(),
            ),
            events: EventService::new(events_repo.clone(), storage),
            registrations: RegistrationService::new(
                registrations_repo,
                events_repo,
                users_repo,
                notifier,
            ),
        }
    }
}
