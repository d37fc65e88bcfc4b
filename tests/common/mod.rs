/// Common test utilities for integration tests
///
/// Provides a [`TestContext`] wiring the full service stack over the
/// in-memory store, with recording doubles for the mailer and object
/// storage so tests can observe side effects.
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use eventhub::auth::Principal;
use eventhub::config::{Config, JwtConfig, TableConfig};
use eventhub::db::MemoryStore;
use eventhub::models::UserRole;
use eventhub::notify::{Notification, Notifier, NotifyError};
use eventhub::service::{App, RegisterUser};
use eventhub::storage::{ObjectStorage, StorageError};

/// Password used for every seeded account
pub const PASSWORD: &str = "correct horse battery staple";

/// JWT secret used by tests
pub const JWT_SECRET: &str = "test-secret-key-of-at-least-32-bytes";

/// Notifier that records everything instead of sending
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<Notification>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: Notification) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(notification);
        Ok(())
    }
}

/// Object storage that records uploads and fabricates public URLs
#[derive(Default)]
pub struct RecordingStorage {
    pub uploads: Mutex<Vec<String>>,
}

#[async_trait]
impl ObjectStorage for RecordingStorage {
    async fn upload_image(
        &self,
        _data: Bytes,
        _content_type: &str,
        owner_id: &str,
        path_prefix: &str,
        file_name: &str,
    ) -> Result<String, StorageError> {
        let url = format!("https://cdn.test/{path_prefix}/{owner_id}/{file_name}");
        self.uploads.lock().unwrap().push(url.clone());
        Ok(url)
    }
}

/// Test context containing the wired service stack
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: App,
    pub notifier: Arc<RecordingNotifier>,
    pub storage: Arc<RecordingStorage>,
}

pub fn test_config() -> Config {
    Config {
        app_url: "http://localhost:8080".to_string(),
        jwt: JwtConfig {
            secret: JWT_SECRET.to_string(),
        },
        tables: TableConfig::default(),
        email: None,
        storage: None,
    }
}

impl TestContext {
    /// Context with mail and storage doubles attached
    pub fn new() -> Self {
        init_tracing();
        let store = Arc::new(MemoryStore::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let storage = Arc::new(RecordingStorage::default());
        let app = App::with_collaborators(
            &test_config(),
            store.clone(),
            Some(notifier.clone() as Arc<dyn Notifier>),
            Some(storage.clone() as Arc<dyn ObjectStorage>),
        );
        Self {
            store,
            app,
            notifier,
            storage,
        }
    }

    /// Context with neither mail nor storage configured
    pub fn without_collaborators() -> Self {
        init_tracing();
        let store = Arc::new(MemoryStore::new());
        let app = App::with_collaborators(&test_config(), store.clone(), None, None);
        Self {
            store,
            app,
            notifier: Arc::new(RecordingNotifier::default()),
            storage: Arc::new(RecordingStorage::default()),
        }
    }

    /// Registers and activates a user, returning its principal
    pub async fn seed_user(&self, name: &str, email: &str, role: UserRole) -> Principal {
        let view = self
            .app
            .users
            .register(RegisterUser {
                name: name.to_string(),
                email: email.to_string(),
                password: PASSWORD.to_string(),
                phone: "555-0100".to_string(),
                role,
            })
            .await
            .expect("seed user");
        if !view.is_active {
            self.app.auth.verify_email(&view.id).await.expect("activate");
        }
        Principal::new(view.id, role)
    }

    /// Everything the recording notifier has seen so far
    pub fn sent(&self) -> Vec<Notification> {
        self.notifier.sent.lock().unwrap().clone()
    }

    /// Drops recorded notifications (useful after seeding)
    pub fn clear_sent(&self) {
        self.notifier.sent.lock().unwrap().clear();
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eventhub=debug".into()),
        )
        .try_init();
}
