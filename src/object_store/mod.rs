mod local;
mod s3;

pub use local::LocalStore;
pub use s3::S3Store;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("Invalid object key: {0}")]
    InvalidKey(String),
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Abstraction over signed-URL object storage backends.
///
/// The service never moves file bytes itself: it hands out time-bounded
/// capability URLs and clients transfer directly against the backend. Keys
/// are opaque `{owner}/{uuid}.{ext}` strings; the raw blobs are meaningless
/// without the metadata DB.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Issue a time-bounded pre-authorized write URL for a key. The upload
    /// itself happens client-side and is not verified here.
    fn issue_upload_url(&self, key: &str, content_type: &str)
        -> Result<String, ObjectStoreError>;

    /// Issue a time-bounded pre-authorized read URL for a key. Existence is
    /// not checked -- callers verify against the entity store first.
    fn issue_download_url(&self, key: &str) -> Result<String, ObjectStoreError>;

    /// Idempotent delete: removing an absent key succeeds. Backend failures
    /// are recoverable errors for retry/cleanup tooling.
    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError>;

    /// Existence probe, used by tests and reconciliation tooling.
    async fn exists(&self, key: &str) -> Result<bool, ObjectStoreError>;
}

/// Derive a fresh object key for an owner: `{owner}/{uuid}.{ext}` with the
/// extension inferred from the MIME type.
pub fn derive_key(owner_id: &str, mime_type: &str) -> String {
    let ext = mime_guess::get_mime_extensions_str(mime_type)
        .and_then(|exts| exts.first())
        .copied()
        .unwrap_or("bin");
    format!("{owner_id}/{}.{ext}", uuid::Uuid::new_v4())
}

/// Reject keys that could escape the storage root or collide with URL syntax.
pub(crate) fn validate_key(key: &str) -> Result<(), ObjectStoreError> {
    if key.is_empty()
        || key.starts_with('/')
        || key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..")
    {
        return Err(ObjectStoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

pub(crate) fn hex_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 2);
    for byte in data {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
