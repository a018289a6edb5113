use async_trait::async_trait;
use reqwest::Client;

use super::{Notifier, NotifyError};

/// Notifier backed by an HTTP mail provider (JSON POST with bearer auth).
pub struct HttpNotifier {
    endpoint: String,
    api_token: String,
    from_address: String,
    client: Client,
}

impl HttpNotifier {
    pub fn new(endpoint: &str, api_token: &str, from_address: &str) -> Result<Self, anyhow::Error> {
        let client = Client::builder().build()?;
        Ok(Self {
            endpoint: endpoint.to_string(),
            api_token: api_token.to_string(),
            from_address: from_address.to_string(),
            client,
        })
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        text: &str,
        html: &str,
    ) -> Result<(), NotifyError> {
        let body = serde_json::json!({
            "from": self.from_address,
            "to": to,
            "subject": subject,
            "text": text,
            "html": html,
        });

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(NotifyError::Provider(format!("{status}: {body}")));
        }

        Ok(())
    }
}
