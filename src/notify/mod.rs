mod http;
mod log;

pub use http::HttpNotifier;
pub use log::LogNotifier;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Provider rejected message: {0}")]
    Provider(String),
}

/// Best-effort email dispatch. Notification is advisory: callers log failures
/// and never roll back entity-store state because a send failed.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        text: &str,
        html: &str,
    ) -> Result<(), NotifyError>;
}
