use wecker_models::{
    chrono::{DateTime, Utc},
    reminder::{Reminder, ReminderPayload},
};

#[derive(sqlx::FromRow)]
pub struct ReminderRow {
    pub id: i64,
    pub user_id: i64,
    pub channel_id: i64,
    pub guild_id: i64,
    pub payload_kind: String,
    pub payload: String,
    pub remind_at: i64,
    pub pinged: bool,
    pub created_at: i64,
}

impl From<ReminderRow> for Reminder {
    fn from(value: ReminderRow) -> Self {
        Self {
            id: value.id,
            user_id: value.user_id,
            channel_id: value.channel_id,
            guild_id: value.guild_id,
            payload: parse_payload(&value.payload_kind, value.payload),
            remind_at: epoch_to_utc(value.remind_at),
            pinged: value.pinged,
            created_at: epoch_to_utc(value.created_at),
        }
    }
}

pub fn convert_payload(payload: ReminderPayload) -> (&'static str, String) {
    match payload {
        ReminderPayload::Text(raw) => ("text", raw),
        ReminderPayload::Embed(raw) => ("embed", raw),
    }
}

fn parse_payload(kind: &str, raw: String) -> ReminderPayload {
    match kind {
        "text" => ReminderPayload::Text(raw),
        "embed" => ReminderPayload::Embed(raw),
        other => {
            log::warn!("Unknown payload kind {}, treating as text", other);
            ReminderPayload::Text(raw)
        }
    }
}

fn epoch_to_utc(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH)
}
