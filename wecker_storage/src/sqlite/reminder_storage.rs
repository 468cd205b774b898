mod model;

use async_trait::async_trait;
use model::{ReminderRow, convert_payload};
use thiserror::Error;
use wecker_models::{
    chrono::{DateTime, Utc},
    reminder::{Reminder, ReminderId},
};

use crate::{NewReminder, ReminderStorage};

#[derive(Debug, Error)]
pub enum SqliteReminderError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub struct SqliteReminderStorage {
    pool: sqlx::SqlitePool,
}

impl SqliteReminderStorage {
    pub fn new(pool: sqlx::SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReminderStorage for SqliteReminderStorage {
    type Error = SqliteReminderError;

    async fn insert(&self, reminder: NewReminder) -> Result<Reminder, Self::Error> {
        let NewReminder {
            user_id,
            channel_id,
            guild_id,
            payload,
            remind_at,
            pinged,
        } = reminder;
        let (payload_kind, payload) = convert_payload(payload);

        let created = sqlx::query_as::<_, ReminderRow>(
            "INSERT INTO reminders (user_id, channel_id, guild_id, payload_kind, payload, remind_at, pinged, created_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(user_id)
        .bind(channel_id)
        .bind(guild_id)
        .bind(payload_kind)
        .bind(payload)
        .bind(remind_at.timestamp())
        .bind(pinged)
        .bind(Utc::now().timestamp())
        .fetch_one(&self.pool)
        .await?;

        Ok(created.into())
    }

    async fn find_due(&self, at: DateTime<Utc>) -> Result<Vec<Reminder>, Self::Error> {
        let rows = sqlx::query_as::<_, ReminderRow>(
            "SELECT * FROM reminders WHERE remind_at <= ? ORDER BY remind_at, id",
        )
        .bind(at.timestamp())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn delete(&self, id: ReminderId) -> Result<bool, Self::Error> {
        let result = sqlx::query("DELETE FROM reminders WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
