use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub node: NodeConfig,
    pub storage: StorageConfig,
    pub notifier: NotifierConfig,
    /// Enables dangerous operations like purge. Must never be true in production.
    pub test_mode: bool,
    /// Lifetime of presigned upload/download URLs, in seconds
    pub url_ttl_secs: u64,
}

#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub bind_address: String,
    pub data_dir: String,
    /// Base URL clients can reach this process at; local-backend capability
    /// URLs are issued under it.
    pub public_base_url: String,
}

#[derive(Debug, Clone)]
pub enum StorageBackend {
    Local,
    S3,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Directory for local storage backend
    pub local_storage_path: String,
    /// HMAC secret for local capability tokens
    pub local_signing_secret: String,
    /// S3 settings (required when backend is s3)
    pub s3_bucket: Option<String>,
    pub s3_region: String,
    pub s3_access_key: Option<String>,
    pub s3_secret_key: Option<String>,
    /// Custom S3-compatible endpoint (e.g. MinIO); enables path-style URLs
    pub s3_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub enum NotifierBackend {
    Http,
    Log,
}

#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub backend: NotifierBackend,
    /// Mail provider endpoint (required when backend is http)
    pub endpoint: Option<String>,
    pub api_token: Option<String>,
    pub from_address: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Local,
            local_storage_path: "./files".to_string(),
            local_signing_secret: "dev-only-secret".to_string(),
            s3_bucket: None,
            s3_region: "us-east-1".to_string(),
            s3_access_key: None,
            s3_secret_key: None,
            s3_endpoint: None,
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            backend: NotifierBackend::Log,
            endpoint: None,
            api_token: None,
            from_address: "noreply@localhost".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string());

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| "./data".to_string());

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8080".to_string());

        let test_mode = std::env::var("TEST_MODE")
            .map(|v| v == "true" || v == "1")
            .unwrap_or(false);

        let url_ttl_secs = std::env::var("URL_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(3600);

        let storage_backend = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".to_string())
            .to_lowercase()
            .as_str()
        {
            "s3" => StorageBackend::S3,
            _ => StorageBackend::Local,
        };

        let local_storage_path =
            std::env::var("LOCAL_STORAGE_PATH").unwrap_or_else(|_| "./files".to_string());

        let local_signing_secret = std::env::var("LOCAL_SIGNING_SECRET").unwrap_or_else(|_| {
            tracing::warn!(
                "LOCAL_SIGNING_SECRET not set; using an ephemeral secret. \
                 Outstanding capability URLs will not survive a restart."
            );
            uuid::Uuid::new_v4().to_string()
        });

        let notifier_backend = match std::env::var("NOTIFIER_BACKEND")
            .unwrap_or_else(|_| "log".to_string())
            .to_lowercase()
            .as_str()
        {
            "http" => NotifierBackend::Http,
            _ => NotifierBackend::Log,
        };

        let config = Config {
            node: NodeConfig {
                bind_address,
                data_dir,
                public_base_url,
            },
            storage: StorageConfig {
                backend: storage_backend,
                local_storage_path,
                local_signing_secret,
                s3_bucket: std::env::var("S3_BUCKET").ok(),
                s3_region: std::env::var("S3_REGION")
                    .unwrap_or_else(|_| "us-east-1".to_string()),
                s3_access_key: std::env::var("S3_ACCESS_KEY").ok(),
                s3_secret_key: std::env::var("S3_SECRET_KEY").ok(),
                s3_endpoint: std::env::var("S3_ENDPOINT").ok(),
            },
            notifier: NotifierConfig {
                backend: notifier_backend,
                endpoint: std::env::var("MAIL_API_ENDPOINT").ok(),
                api_token: std::env::var("MAIL_API_TOKEN").ok(),
                from_address: std::env::var("MAIL_FROM_ADDRESS")
                    .unwrap_or_else(|_| "noreply@localhost".to_string()),
            },
            test_mode,
            url_ttl_secs,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.url_ttl_secs == 0 {
            return Err(ConfigError::ValidationError(
                "URL_TTL_SECS must be greater than 0".to_string(),
            ));
        }

        if matches!(self.storage.backend, StorageBackend::S3) {
            for (name, value) in [
                ("S3_BUCKET", &self.storage.s3_bucket),
                ("S3_ACCESS_KEY", &self.storage.s3_access_key),
                ("S3_SECRET_KEY", &self.storage.s3_secret_key),
            ] {
                if value.is_none() {
                    return Err(ConfigError::ValidationError(format!(
                        "{name} is required when STORAGE_BACKEND=s3"
                    )));
                }
            }
        }

        if matches!(self.notifier.backend, NotifierBackend::Http) {
            if self.notifier.endpoint.is_none() {
                return Err(ConfigError::ValidationError(
                    "MAIL_API_ENDPOINT is required when NOTIFIER_BACKEND=http".to_string(),
                ));
            }
            if self.notifier.api_token.is_none() {
                return Err(ConfigError::ValidationError(
                    "MAIL_API_TOKEN is required when NOTIFIER_BACKEND=http".to_string(),
                ));
            }
        }

        Ok(())
    }
}
