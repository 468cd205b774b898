use wecker_models::{
    chrono::{DateTime, Utc},
    reminder::{ChannelId, GuildId, ReminderPayload, UserId},
};

pub struct NewReminder {
    pub user_id: UserId,
    pub channel_id: ChannelId,
    pub guild_id: GuildId,
    pub payload: ReminderPayload,
    pub remind_at: DateTime<Utc>,
    pub pinged: bool,
}
