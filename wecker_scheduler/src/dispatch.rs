use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use wecker_models::reminder::{Reminder, ReminderPayload};
use wecker_storage::ReminderStorage;

use crate::delivery::{DeliveryError, OutgoingReminder, ReminderDeliveryChannel};

pub const SWEEP_PERIOD: Duration = Duration::from_secs(60);

/// Periodically finds due reminders, hands each to the delivery channel once,
/// and removes it whatever the outcome.
pub struct ReminderDispatcher<S> {
    storage: Arc<S>,
    delivery: Arc<dyn ReminderDeliveryChannel>,
    period: Duration,
}

pub struct DispatcherHandle {
    cancellation_token: CancellationToken,
    task: JoinHandle<()>,
}

impl DispatcherHandle {
    pub async fn shutdown(self) {
        self.cancellation_token.cancel();
        let _ = self.task.await;
    }
}

impl<S: ReminderStorage + 'static> ReminderDispatcher<S> {
    pub fn new(storage: Arc<S>, delivery: Arc<dyn ReminderDeliveryChannel>) -> Self {
        Self {
            storage,
            delivery,
            period: SWEEP_PERIOD,
        }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub fn spawn(self) -> DispatcherHandle {
        let cancellation_token = CancellationToken::new();
        let child_token = cancellation_token.child_token();
        let task = tokio::spawn(async move { self.run(child_token).await });

        DispatcherHandle {
            cancellation_token,
            task,
        }
    }

    async fn run(self, cancellation_token: CancellationToken) {
        log::info!("Reminder dispatcher sweeping every {:?}", self.period);
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancellation_token.cancelled() => {
                    log::info!("Reminder dispatcher shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(err) = self.sweep(Utc::now()).await {
                        log::error!("Reminder sweep failed: {err:#}");
                    }
                }
            }
        }
    }

    /// One pass: every record due at `now` gets exactly one delivery attempt
    /// and is then deleted. A bad record never stops the rest of the batch.
    pub async fn sweep(&self, now: DateTime<Utc>) -> anyhow::Result<()> {
        let due = self.storage.find_due(now).await?;
        for reminder in due {
            self.dispatch(&reminder).await;

            // A crash before this delete re-delivers the record on the next
            // sweep; at-most-once holds within a single process lifetime.
            match self.storage.delete(reminder.id).await {
                Ok(true) => {}
                Ok(false) => log::warn!("Reminder {} was already gone", reminder.id),
                Err(err) => log::error!("Failed to delete reminder {}: {}", reminder.id, err),
            }
        }

        Ok(())
    }

    async fn dispatch(&self, reminder: &Reminder) {
        let message = render(reminder);
        match self.delivery.send_reminder(reminder.channel_id, message).await {
            Ok(()) => log::info!(
                "Delivered reminder {} to channel {}",
                reminder.id,
                reminder.channel_id
            ),
            Err(DeliveryError::PayloadRejected) => {
                // Embed bodies the platform refuses still reach the user verbatim.
                let fallback =
                    OutgoingReminder::Text(with_mention(reminder, reminder.payload.raw()));
                if let Err(err) = self
                    .delivery
                    .send_reminder(reminder.channel_id, fallback)
                    .await
                {
                    log::error!(
                        "Fallback delivery for reminder {} failed: {err}",
                        reminder.id
                    );
                }
            }
            Err(DeliveryError::DestinationUnavailable(channel_id)) => {
                log::warn!(
                    "Dropping reminder {}: channel {channel_id} is gone",
                    reminder.id
                );
            }
            Err(err) => log::error!("Failed to deliver reminder {}: {err}", reminder.id),
        }
    }
}

fn render(reminder: &Reminder) -> OutgoingReminder {
    match &reminder.payload {
        ReminderPayload::Text(text) => OutgoingReminder::Text(with_mention(reminder, text)),
        ReminderPayload::Embed(raw) => match normalize_embeds(raw) {
            Ok(embeds) => OutgoingReminder::Embeds {
                content: reminder
                    .pinged
                    .then(|| format!("<@{}>", reminder.user_id)),
                embeds,
            },
            Err(err) => {
                log::warn!(
                    "Reminder {} carries a corrupted embed payload ({err}), sending it verbatim",
                    reminder.id
                );

                OutgoingReminder::Text(with_mention(reminder, raw))
            }
        },
    }
}

// A stored embed document is either a wrapper with an ordered "embeds" list,
// a single wrapped "embed", or one bare embed object.
fn normalize_embeds(raw: &str) -> Result<Vec<serde_json::Value>, serde_json::Error> {
    let document: serde_json::Value = serde_json::from_str(raw)?;

    Ok(match document {
        serde_json::Value::Object(mut map) => {
            if let Some(serde_json::Value::Array(embeds)) = map.get("embeds") {
                embeds.clone()
            } else if let Some(embed) = map.remove("embed") {
                vec![embed]
            } else {
                vec![serde_json::Value::Object(map)]
            }
        }
        other => vec![other],
    })
}

fn with_mention(reminder: &Reminder, text: &str) -> String {
    if reminder.pinged {
        format!("<@{}> {}", reminder.user_id, text)
    } else {
        text.to_owned()
    }
}

#[cfg(test)]
mod tests;
