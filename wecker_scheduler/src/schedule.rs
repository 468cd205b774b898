use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use thiserror::Error;
use wecker_models::reminder::{ChannelId, GuildId, Reminder, ReminderPayload, UserId};
use wecker_storage::{NewReminder, ReminderStorage};

use crate::berlin;

/// How the `when` string is to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhenKind {
    /// A relative count of minutes from now.
    Minutes,
    /// An absolute Berlin wall-clock reading, `DD.MM.YY HH:MM`.
    Date,
}

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("minutes must be a positive whole number")]
    InvalidDuration,
    #[error("expected DD.MM.YY HH:MM")]
    InvalidFormat,
    #[error("that time has already passed")]
    PastInstant,
    #[error("embed payload is not valid JSON")]
    InvalidPayload,
    #[error("failed to store the reminder")]
    Storage(#[source] anyhow::Error),
}

pub struct ScheduleRequest {
    pub user_id: UserId,
    pub channel_id: ChannelId,
    pub guild_id: GuildId,
    pub kind: WhenKind,
    pub when: String,
    pub payload: ReminderPayload,
    pub pinged: bool,
}

pub struct ReminderScheduler<S> {
    storage: Arc<S>,
}

impl<S: ReminderStorage> ReminderScheduler<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    /// Validates the request completely, then persists it with a single
    /// insert. Nothing is written when any validation step fails.
    pub async fn schedule(&self, request: ScheduleRequest) -> Result<Reminder, ScheduleError> {
        let remind_at = resolve_remind_at(request.kind, &request.when, Utc::now())?;

        if let ReminderPayload::Embed(raw) = &request.payload {
            serde_json::from_str::<serde_json::Value>(raw)
                .map_err(|_| ScheduleError::InvalidPayload)?;
        }

        let reminder = self
            .storage
            .insert(NewReminder {
                user_id: request.user_id,
                channel_id: request.channel_id,
                guild_id: request.guild_id,
                payload: request.payload,
                remind_at,
                pinged: request.pinged,
            })
            .await
            .map_err(|err| ScheduleError::Storage(err.into()))?;

        log::info!(
            "Stored reminder {} for user {}, due at {}",
            reminder.id,
            reminder.user_id,
            reminder.remind_at
        );

        Ok(reminder)
    }
}

fn resolve_remind_at(
    kind: WhenKind,
    when: &str,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, ScheduleError> {
    match kind {
        WhenKind::Minutes => {
            let minutes: i64 = when
                .trim()
                .parse()
                .map_err(|_| ScheduleError::InvalidDuration)?;
            if minutes <= 0 {
                return Err(ScheduleError::InvalidDuration);
            }

            Ok(now + TimeDelta::minutes(minutes))
        }
        WhenKind::Date => {
            let remind_at =
                berlin::parse_berlin_date(when).map_err(|_| ScheduleError::InvalidFormat)?;
            if remind_at <= now {
                return Err(ScheduleError::PastInstant);
            }

            Ok(remind_at)
        }
    }
}
