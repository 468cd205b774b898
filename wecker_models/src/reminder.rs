use chrono::{DateTime, Utc};

pub type ReminderId = i64;
pub type UserId = i64;
pub type ChannelId = i64;
pub type GuildId = i64;

/// What gets sent when the reminder fires. The embed variant keeps the
/// document exactly as submitted; it is only parsed again at delivery time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReminderPayload {
    Text(String),
    Embed(String),
}

impl ReminderPayload {
    pub fn raw(&self) -> &str {
        match self {
            ReminderPayload::Text(raw) | ReminderPayload::Embed(raw) => raw,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Reminder {
    pub id: ReminderId,
    pub user_id: UserId,
    pub channel_id: ChannelId,
    pub guild_id: GuildId,
    pub payload: ReminderPayload,
    pub remind_at: DateTime<Utc>,
    pub pinged: bool,
    pub created_at: DateTime<Utc>,
}
