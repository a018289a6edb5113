use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use ring::hmac;
use std::path::{Path, PathBuf};

use super::{hex_encode, validate_key, ObjectStore, ObjectStoreError};

/// Local filesystem object store for development and testing.
///
/// Capability URLs point back at this process (`/objects/*key` routes) and
/// carry an expiry plus an HMAC token binding the method, key, and expiry, so
/// local URLs behave like presigned ones: time-bounded and non-forgeable.
pub struct LocalStore {
    base_path: PathBuf,
    public_base_url: String,
    token_key: hmac::Key,
    url_ttl_secs: u64,
}

impl LocalStore {
    pub fn new<P: AsRef<Path>>(
        base_path: P,
        public_base_url: &str,
        signing_secret: &str,
        url_ttl_secs: u64,
    ) -> Result<Self, std::io::Error> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self {
            base_path,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            token_key: hmac::Key::new(hmac::HMAC_SHA256, signing_secret.as_bytes()),
            url_ttl_secs,
        })
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, ObjectStoreError> {
        validate_key(key)?;
        Ok(self.base_path.join(key))
    }

    fn token(&self, method: &str, key: &str, expires: i64) -> String {
        let message = format!("{method}:{key}:{expires}");
        hex_encode(hmac::sign(&self.token_key, message.as_bytes()).as_ref())
    }

    fn capability_url(&self, method: &str, key: &str) -> Result<String, ObjectStoreError> {
        validate_key(key)?;
        let expires = Utc::now().timestamp() + self.url_ttl_secs as i64;
        let token = self.token(method, key, expires);
        Ok(format!(
            "{}/objects/{key}?expires={expires}&token={token}",
            self.public_base_url
        ))
    }

    /// Validate a capability token for a request hitting the object routes.
    pub fn verify_token(&self, method: &str, key: &str, expires: i64, token: &str) -> bool {
        if expires < Utc::now().timestamp() {
            return false;
        }
        let expected = self.token(method, key, expires);
        ring::constant_time::verify_slices_are_equal(expected.as_bytes(), token.as_bytes())
            .is_ok()
    }

    /// Write blob bytes, creating owner subdirectories as needed.
    pub async fn put(&self, key: &str, data: Bytes) -> Result<(), ObjectStoreError> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, &data).await?;
        Ok(())
    }

    /// Read blob bytes.
    pub async fn get(&self, key: &str) -> Result<Bytes, ObjectStoreError> {
        let path = self.object_path(key)?;
        if !path.exists() {
            return Err(ObjectStoreError::NotFound(key.to_string()));
        }
        let data = tokio::fs::read(&path).await?;
        Ok(Bytes::from(data))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    fn issue_upload_url(
        &self,
        key: &str,
        _content_type: &str,
    ) -> Result<String, ObjectStoreError> {
        self.capability_url("PUT", key)
    }

    fn issue_download_url(&self, key: &str) -> Result<String, ObjectStoreError> {
        self.capability_url("GET", key)
    }

    async fn delete(&self, key: &str) -> Result<(), ObjectStoreError> {
        let path = self.object_path(key)?;
        if path.exists() {
            tokio::fs::remove_file(&path).await?;
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, ObjectStoreError> {
        let path = self.object_path(key)?;
        Ok(path.exists())
    }
}
