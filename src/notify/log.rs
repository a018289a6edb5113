use async_trait::async_trait;

use super::{Notifier, NotifyError};

/// Development notifier: logs instead of sending.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        text: &str,
        _html: &str,
    ) -> Result<(), NotifyError> {
        tracing::info!(to = %to, subject = %subject, body = %text, "Email suppressed (log notifier)");
        Ok(())
    }
}
