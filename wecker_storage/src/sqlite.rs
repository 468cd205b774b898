mod reminder_storage;

pub use reminder_storage::{SqliteReminderError, SqliteReminderStorage};

pub async fn migrate(pool: &sqlx::SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!().run(pool).await
}
