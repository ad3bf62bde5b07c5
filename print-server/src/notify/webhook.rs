use super::{NotificationSink, SinkError};
use async_trait::async_trait;
use serde::Serialize;
use shared::models::Notification;
use std::time::Duration;

#[derive(Serialize)]
struct WebhookPayload<'a> {
    recipient_id: i64,
    notifications: &'a [Notification],
}

/// POSTs each recipient batch as JSON; any non-2xx response is a failure
pub struct WebhookSink {
    url: String,
    client: reqwest::Client,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SinkError::Unavailable(format!("HTTP client: {e}")))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn deliver(
        &self,
        recipient_id: i64,
        notifications: &[Notification],
    ) -> Result<(), SinkError> {
        let resp = self
            .client
            .post(&self.url)
            .json(&WebhookPayload {
                recipient_id,
                notifications,
            })
            .send()
            .await
            .map_err(|e| SinkError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(SinkError::Rejected { status, body });
        }

        tracing::debug!(recipient_id, count = notifications.len(), url = %self.url, "Webhook accepted batch");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "webhook"
    }
}
