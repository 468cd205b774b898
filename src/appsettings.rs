use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct DiscordSettings {
    pub token: String,
}

#[derive(Deserialize, Debug)]
pub struct DatabaseSettings {
    pub url: String,
}

#[derive(Deserialize, Debug)]
pub struct AppSettings {
    pub discord: DiscordSettings,
    pub database: DatabaseSettings,
    #[serde(default = "default_schedule_image")]
    pub schedule_image: PathBuf,
}

fn default_schedule_image() -> PathBuf {
    PathBuf::from("specialevents.webp")
}

impl AppSettings {
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("appsettings").required(true))
            .add_source(File::with_name("appsettings.local").required(false))
            .add_source(Environment::with_prefix("WECKER").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}
