//! Notification delivery
//!
//! The scheduler hands each recipient's batch to a [`NotificationSink`] and
//! only marks the batch delivered after the sink returns `Ok`.

pub mod log_sink;
pub mod webhook;

pub use log_sink::LogSink;
pub use webhook::WebhookSink;

use async_trait::async_trait;
use shared::error::{AppError, ErrorCode};
use shared::models::Notification;
use thiserror::Error;

/// Sink errors
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Delivery request failed: {0}")]
    Transport(String),

    #[error("Delivery rejected with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Sink unavailable: {0}")]
    Unavailable(String),
}

impl From<SinkError> for AppError {
    fn from(err: SinkError) -> Self {
        AppError::with_message(ErrorCode::NotificationDeliveryFailed, err.to_string())
    }
}

/// Outbound channel for notifications
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Deliver one recipient's batch. All or nothing from the caller's view.
    async fn deliver(
        &self,
        recipient_id: i64,
        notifications: &[Notification],
    ) -> Result<(), SinkError>;

    fn name(&self) -> &'static str;
}
