//! Shared helpers for fileshare integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use fileshare::config::{Config, NodeConfig, NotifierConfig, StorageConfig};
use fileshare::notify::{Notifier, NotifyError};
use fileshare::object_store::{LocalStore, ObjectStore, ObjectStoreError};
use fileshare::ops::Principal;
use fileshare::storage::models::UserRecord;
use fileshare::storage::Database;
use fileshare::AppState;

/// A notifier that records every send instead of delivering.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<SentEmail>>,
}

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub text: String,
}

impl RecordingNotifier {
    pub fn sent_to(&self) -> Vec<String> {
        self.sent.lock().unwrap().iter().map(|e| e.to.clone()).collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        text: &str,
        _html: &str,
    ) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(SentEmail {
            to: to.to_string(),
            subject: subject.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }
}

/// A notifier that always fails, for exercising the fire-and-forget
/// delivery paths.
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send(
        &self,
        _to: &str,
        _subject: &str,
        _text: &str,
        _html: &str,
    ) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("connection refused".to_string()))
    }
}

/// An object store whose deletes always fail. URL issuance and reads go
/// through a real local store so the rest of the pipeline behaves normally.
pub struct BrokenDeleteStore {
    inner: Arc<LocalStore>,
}

#[async_trait]
impl ObjectStore for BrokenDeleteStore {
    fn issue_upload_url(
        &self,
        key: &str,
        content_type: &str,
    ) -> Result<String, ObjectStoreError> {
        self.inner.issue_upload_url(key, content_type)
    }

    fn issue_download_url(&self, key: &str) -> Result<String, ObjectStoreError> {
        self.inner.issue_download_url(key)
    }

    async fn delete(&self, _key: &str) -> Result<(), ObjectStoreError> {
        Err(ObjectStoreError::Backend(
            "storage backend offline".to_string(),
        ))
    }

    async fn exists(&self, key: &str) -> Result<bool, ObjectStoreError> {
        self.inner.exists(key).await
    }
}

fn test_config(temp_dir: &tempfile::TempDir) -> Config {
    Config {
        node: NodeConfig {
            bind_address: "127.0.0.1:0".to_string(),
            data_dir: temp_dir.path().join("data").to_string_lossy().to_string(),
            public_base_url: "http://localhost:8080".to_string(),
        },
        storage: StorageConfig::default(),
        notifier: NotifierConfig::default(),
        test_mode: true,
        url_ttl_secs: 3600,
    }
}

fn test_local_store(temp_dir: &tempfile::TempDir) -> Arc<LocalStore> {
    Arc::new(
        LocalStore::new(
            temp_dir.path().join("files"),
            "http://localhost:8080",
            "test-secret",
            3600,
        )
        .expect("Failed to create test object store"),
    )
}

fn build_state(
    temp_dir: &tempfile::TempDir,
    object_store: Arc<dyn ObjectStore>,
    local_store: Arc<LocalStore>,
    notifier: Arc<dyn Notifier>,
) -> Arc<AppState> {
    let config = test_config(temp_dir);
    let db = Database::open(temp_dir.path().join("data")).expect("Failed to open test database");
    Arc::new(AppState {
        config,
        db,
        object_store,
        notifier,
        local_store: Some(local_store),
    })
}

/// Create a test AppState with a temporary database, local object store, and
/// recording notifier.
pub fn test_state(temp_dir: &tempfile::TempDir) -> (Arc<AppState>, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let store = test_local_store(temp_dir);
    let state = build_state(
        temp_dir,
        Arc::clone(&store) as Arc<dyn ObjectStore>,
        store,
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );
    (state, notifier)
}

/// Like `test_state`, but every object-store delete fails.
pub fn test_state_with_broken_deletes(
    temp_dir: &tempfile::TempDir,
) -> (Arc<AppState>, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let store = test_local_store(temp_dir);
    let broken = Arc::new(BrokenDeleteStore {
        inner: Arc::clone(&store),
    });
    let state = build_state(
        temp_dir,
        broken as Arc<dyn ObjectStore>,
        store,
        Arc::clone(&notifier) as Arc<dyn Notifier>,
    );
    (state, notifier)
}

/// Like `test_state`, but every notification send fails.
pub fn test_state_with_failing_notifier(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    let store = test_local_store(temp_dir);
    build_state(
        temp_dir,
        Arc::clone(&store) as Arc<dyn ObjectStore>,
        store,
        Arc::new(FailingNotifier) as Arc<dyn Notifier>,
    )
}

/// Register a user and return the matching principal.
pub fn register_user(state: &AppState, email: &str) -> Principal {
    let user = UserRecord {
        id: uuid::Uuid::new_v4().to_string(),
        email: email.to_string(),
        created_at: Utc::now(),
    };
    state.db.put_user(&user).expect("Failed to register user");
    Principal {
        id: user.id,
        email: user.email,
    }
}
