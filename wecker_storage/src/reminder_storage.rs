use std::collections::HashMap;
use std::convert::Infallible;

use async_trait::async_trait;
use tokio::sync::RwLock;
use wecker_models::{
    chrono::{DateTime, Utc},
    reminder::{Reminder, ReminderId},
};

use crate::NewReminder;

#[async_trait]
pub trait ReminderStorage: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    async fn insert(&self, reminder: NewReminder) -> Result<Reminder, Self::Error>;
    /// All reminders with `remind_at <= at`, oldest first.
    async fn find_due(&self, at: DateTime<Utc>) -> Result<Vec<Reminder>, Self::Error>;
    /// Returns whether a record was actually removed. Deleting an id that is
    /// already gone is not an error.
    async fn delete(&self, id: ReminderId) -> Result<bool, Self::Error>;
}

struct InMemoryStore {
    current_id: ReminderId,
    reminders: HashMap<ReminderId, Reminder>,
}

pub struct InMemoryReminderStorage {
    store: RwLock<InMemoryStore>,
}

impl InMemoryReminderStorage {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(InMemoryStore {
                current_id: 1,
                reminders: HashMap::new(),
            }),
        }
    }
}

impl Default for InMemoryReminderStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReminderStorage for InMemoryReminderStorage {
    type Error = Infallible;

    async fn insert(&self, reminder: NewReminder) -> Result<Reminder, Self::Error> {
        let mut store = self.store.write().await;
        let id = store.current_id;
        store.current_id += 1;

        let reminder = Reminder {
            id,
            user_id: reminder.user_id,
            channel_id: reminder.channel_id,
            guild_id: reminder.guild_id,
            payload: reminder.payload,
            remind_at: reminder.remind_at,
            pinged: reminder.pinged,
            created_at: Utc::now(),
        };
        store.reminders.insert(id, reminder.clone());

        Ok(reminder)
    }

    async fn find_due(&self, at: DateTime<Utc>) -> Result<Vec<Reminder>, Self::Error> {
        let store = self.store.read().await;
        let mut due: Vec<_> = store
            .reminders
            .values()
            .filter(|r| r.remind_at <= at)
            .cloned()
            .collect();
        due.sort_by_key(|r| (r.remind_at, r.id));

        Ok(due)
    }

    async fn delete(&self, id: ReminderId) -> Result<bool, Self::Error> {
        let mut store = self.store.write().await;

        Ok(store.reminders.remove(&id).is_some())
    }
}
