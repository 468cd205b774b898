mod appsettings;

use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use wecker_discord::serenity::all::{Client, GatewayIntents};
use wecker_discord::{DiscordDeliveryChannel, Handler, ReactionConfig};
use wecker_scheduler::{ReminderDispatcher, ReminderScheduler};
use wecker_storage::sqlite::{self, SqliteReminderStorage};

use crate::appsettings::AppSettings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::init_timed();

    let settings = AppSettings::load()?;

    let options = SqliteConnectOptions::from_str(&settings.database.url)?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await?;
    sqlite::migrate(&pool).await?;
    log::info!("Database ready at {}", settings.database.url);

    let storage = Arc::new(SqliteReminderStorage::new(pool));
    let scheduler = Arc::new(ReminderScheduler::new(storage.clone()));
    let handler = Handler::new(
        scheduler,
        ReactionConfig::default(),
        settings.schedule_image,
    );

    let intents =
        GatewayIntents::GUILDS | GatewayIntents::GUILD_MESSAGES | GatewayIntents::MESSAGE_CONTENT;
    let mut client = Client::builder(&settings.discord.token, intents)
        .event_handler(handler)
        .await?;

    // The sweep only needs the REST half of the client, so it can start
    // before the gateway connects.
    let delivery = Arc::new(DiscordDeliveryChannel::new(client.http.clone()));
    let dispatcher = ReminderDispatcher::new(storage, delivery).spawn();

    let run_result = client.start().await;
    dispatcher.shutdown().await;

    Ok(run_result?)
}
