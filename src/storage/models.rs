use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An identity principal. Provisioned by the authentication subsystem and
/// immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A project groups files under a single owner. Deleting a project cascades
/// to its member files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

/// A file record stored in redb. The `key` uniquely identifies the backing
/// object in the object store; exactly one record maps to one stored object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: String,
    pub key: String,
    pub name: String,
    pub mime_type: String,
    pub byte_size: u64,
    pub owner_id: String,
    #[serde(default)]
    pub project_id: Option<String>,
    /// Set on records imported via the legacy copy-on-share strategy.
    /// The grant strategy used here never writes it.
    #[serde(default)]
    pub original_sender_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Access level carried by a share grant. Read is the only level the product
/// defines today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
}

/// A share grant: `shared_by` gave `shared_with` access to `file_id`.
/// Grants are append-only; there is no revocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareGrant {
    pub id: String,
    pub file_id: String,
    pub shared_with: String,
    pub shared_by: String,
    pub permission: Permission,
    pub created_at: DateTime<Utc>,
}
