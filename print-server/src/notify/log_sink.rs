use super::{NotificationSink, SinkError};
use async_trait::async_trait;
use shared::models::Notification;

/// Writes notifications to the log. Default when no webhook is configured.
#[derive(Debug, Default, Clone)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    async fn deliver(
        &self,
        recipient_id: i64,
        notifications: &[Notification],
    ) -> Result<(), SinkError> {
        for n in notifications {
            tracing::info!(
                recipient_id,
                notification_id = n.id,
                kind = ?n.kind,
                title = %n.title,
                "Notification delivered"
            );
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
