mod commands;
mod delivery;
mod reactions;

pub use serenity;

pub use delivery::DiscordDeliveryChannel;
pub use reactions::{ReactionAction, ReactionConfig, ReactionEmoji};

use std::path::PathBuf;
use std::sync::Arc;

use serenity::all::{Command, Context, EventHandler, Interaction, Message, Ready};
use serenity::async_trait;
use wecker_scheduler::ReminderScheduler;
use wecker_storage::ReminderStorage;

pub struct Handler<S> {
    scheduler: Arc<ReminderScheduler<S>>,
    reactions: ReactionConfig,
    schedule_image: PathBuf,
}

impl<S> Handler<S> {
    pub fn new(
        scheduler: Arc<ReminderScheduler<S>>,
        reactions: ReactionConfig,
        schedule_image: PathBuf,
    ) -> Self {
        Self {
            scheduler,
            reactions,
            schedule_image,
        }
    }
}

#[async_trait]
impl<S: ReminderStorage + 'static> EventHandler for Handler<S> {
    async fn ready(&self, ctx: Context, ready: Ready) {
        log::info!("Logged in as {}", ready.user.name);

        if let Err(err) = Command::set_global_commands(&ctx.http, commands::definitions()).await {
            log::error!("Failed to register slash commands: {err}");
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }

        let author_id = msg.author.id.get() as i64;
        for action in reactions::classify(&msg.content, author_id, &self.reactions) {
            let outcome = match action {
                ReactionAction::React(emoji) => {
                    msg.react(&ctx.http, emoji.reaction_type()).await.map(drop)
                }
                ReactionAction::Say(text) => msg.channel_id.say(&ctx.http, text).await.map(drop),
            };
            if let Err(err) = outcome {
                log::warn!("Reaction in channel {} failed: {err}", msg.channel_id);
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        let result = match interaction {
            Interaction::Command(command) => {
                commands::handle_command(&ctx, &command, &self.scheduler, &self.schedule_image)
                    .await
            }
            Interaction::Modal(modal) => {
                commands::handle_modal(&ctx, &modal, &self.scheduler).await
            }
            _ => Ok(()),
        };

        if let Err(err) = result {
            log::error!("Interaction handling failed: {err:#}");
        }
    }
}
