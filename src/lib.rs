//! fileshare - file sharing and project collaboration API
//!
//! This crate provides the file-sharing core of a collaboration product:
//! - Projects grouping files under a single owner, with cascading deletion
//! - File lifecycle against signed-URL object storage (S3 or local) -- the
//!   service issues capabilities, clients move the bytes
//! - Share grants with owner-only re-share and best-effort email notification
//! - redb embedded database for entity records (ACID, MVCC, crash-safe)
//! - REST API with JSend envelopes

pub mod api;
pub mod config;
pub mod notify;
pub mod object_store;
pub mod ops;
pub mod storage;

use std::sync::Arc;

use config::Config;
use storage::Database;

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub object_store: Arc<dyn object_store::ObjectStore>,
    pub notifier: Arc<dyn notify::Notifier>,
    /// Set when the local backend is active; backs the /objects routes.
    pub local_store: Option<Arc<object_store::LocalStore>>,
}
