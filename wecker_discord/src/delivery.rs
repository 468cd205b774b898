use std::sync::Arc;

use async_trait::async_trait;
use serenity::all::{ChannelId, CreateEmbed, CreateMessage, Embed};
use serenity::http::Http;
use wecker_models::reminder;
use wecker_scheduler::delivery::{DeliveryError, OutgoingReminder, ReminderDeliveryChannel};

pub struct DiscordDeliveryChannel {
    http: Arc<Http>,
}

impl DiscordDeliveryChannel {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ReminderDeliveryChannel for DiscordDeliveryChannel {
    async fn send_reminder(
        &self,
        channel_id: reminder::ChannelId,
        message: OutgoingReminder,
    ) -> Result<(), DeliveryError> {
        let channel = u64::try_from(channel_id)
            .ok()
            .filter(|id| *id != 0)
            .map(ChannelId::new)
            .ok_or(DeliveryError::DestinationUnavailable(channel_id))?;

        // Resolve before sending: a deleted channel is a skip, not a failure.
        if self.http.get_channel(channel).await.is_err() {
            return Err(DeliveryError::DestinationUnavailable(channel_id));
        }

        let message = match message {
            OutgoingReminder::Text(content) => CreateMessage::new().content(content),
            OutgoingReminder::Embeds { content, embeds } => {
                let embeds = embeds
                    .into_iter()
                    .map(to_create_embed)
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|_| DeliveryError::PayloadRejected)?;
                let message = CreateMessage::new().embeds(embeds);
                match content {
                    Some(content) => message.content(content),
                    None => message,
                }
            }
        };

        channel
            .send_message(&self.http, message)
            .await
            .map_err(|err| DeliveryError::Send(err.into()))?;

        Ok(())
    }
}

fn to_create_embed(value: serde_json::Value) -> Result<CreateEmbed, serde_json::Error> {
    serde_json::from_value::<Embed>(value).map(CreateEmbed::from)
}
