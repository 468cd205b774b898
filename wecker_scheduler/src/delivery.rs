use async_trait::async_trait;
use thiserror::Error;
use wecker_models::reminder::ChannelId;

/// A reminder rendered for the wire: either plain text, or a content line
/// plus an ordered run of embed documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutgoingReminder {
    Text(String),
    Embeds {
        content: Option<String>,
        embeds: Vec<serde_json::Value>,
    },
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("channel {0} cannot be resolved")]
    DestinationUnavailable(ChannelId),
    #[error("the platform rejected the embed payload")]
    PayloadRejected,
    #[error(transparent)]
    Send(#[from] anyhow::Error),
}

#[async_trait]
pub trait ReminderDeliveryChannel: Send + Sync + 'static {
    async fn send_reminder(
        &self,
        channel_id: ChannelId,
        message: OutgoingReminder,
    ) -> Result<(), DeliveryError>;
}
