use std::path::Path;
use std::sync::Arc;

use serenity::all::{
    ActionRowComponent, CommandDataOption, CommandInteraction, CommandOptionType, Context,
    CreateActionRow, CreateAttachment, CreateCommand, CreateCommandOption, CreateInputText,
    CreateInteractionResponse, CreateInteractionResponseMessage, CreateModal, InputTextStyle,
    ModalInteraction,
};
use wecker_models::reminder::ReminderPayload;
use wecker_scheduler::berlin::format_berlin;
use wecker_scheduler::{ReminderScheduler, ScheduleError, ScheduleRequest, WhenKind};
use wecker_storage::ReminderStorage;

const REMINDER_MODAL_ID: &str = "reminder-modal";

pub fn definitions() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new("schedule").description("Shows the special events schedule"),
        CreateCommand::new("remind")
            .description("Set a reminder")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "type", "time or date")
                    .required(true)
                    .add_string_choice("time", "time")
                    .add_string_choice("date", "date"),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "when",
                    "minutes OR DD.MM.YY HH:MM",
                )
                .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "message",
                    "What to remind you about",
                )
                .required(true),
            )
            .add_option(CreateCommandOption::new(
                CommandOptionType::Boolean,
                "get_pinged",
                "Ping you when the reminder fires",
            )),
        CreateCommand::new("remind-embed").description("Set a reminder with an embed"),
    ]
}

pub async fn handle_command<S: ReminderStorage>(
    ctx: &Context,
    command: &CommandInteraction,
    scheduler: &Arc<ReminderScheduler<S>>,
    schedule_image: &Path,
) -> anyhow::Result<()> {
    match command.data.name.as_str() {
        "schedule" => send_schedule_image(ctx, command, schedule_image).await,
        "remind" => remind(ctx, command, scheduler).await,
        "remind-embed" => open_reminder_modal(ctx, command).await,
        other => {
            log::warn!("Ignoring unknown command /{other}");

            Ok(())
        }
    }
}

async fn send_schedule_image(
    ctx: &Context,
    command: &CommandInteraction,
    schedule_image: &Path,
) -> anyhow::Result<()> {
    if !schedule_image.exists() {
        return reply(ctx, command, "No schedule found", false).await;
    }

    let attachment = CreateAttachment::path(schedule_image).await?;
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new().add_file(attachment),
            ),
        )
        .await?;

    Ok(())
}

async fn remind<S: ReminderStorage>(
    ctx: &Context,
    command: &CommandInteraction,
    scheduler: &Arc<ReminderScheduler<S>>,
) -> anyhow::Result<()> {
    let options = &command.data.options;
    let kind = match str_option(options, "type") {
        Some("time") => WhenKind::Minutes,
        _ => WhenKind::Date,
    };
    let when = str_option(options, "when").unwrap_or_default().to_owned();
    let message = str_option(options, "message").unwrap_or_default().to_owned();
    let pinged = bool_option(options, "get_pinged").unwrap_or(true);

    let result = scheduler
        .schedule(ScheduleRequest {
            user_id: command.user.id.get() as i64,
            channel_id: command.channel_id.get() as i64,
            guild_id: command.guild_id.map(|id| id.get() as i64).unwrap_or_default(),
            kind,
            when,
            payload: ReminderPayload::Text(message),
            pinged,
        })
        .await;

    match result {
        Ok(reminder) => {
            let confirmation = format!("Reminder set for {}", format_berlin(reminder.remind_at));

            reply(ctx, command, &confirmation, false).await
        }
        Err(err) => reply(ctx, command, command_error_text(&err), false).await,
    }
}

async fn open_reminder_modal(ctx: &Context, command: &CommandInteraction) -> anyhow::Result<()> {
    let modal = CreateModal::new(REMINDER_MODAL_ID, "Embed Reminder").components(vec![
        CreateActionRow::InputText(
            CreateInputText::new(InputTextStyle::Short, "time or date", "type").required(true),
        ),
        CreateActionRow::InputText(
            CreateInputText::new(InputTextStyle::Short, "minutes OR DD.MM.YY HH:MM", "when")
                .required(true),
        ),
        CreateActionRow::InputText(
            CreateInputText::new(InputTextStyle::Short, "get pinged? true / false", "pinged")
                .required(false),
        ),
        CreateActionRow::InputText(
            CreateInputText::new(InputTextStyle::Paragraph, "Embed JSON", "embed").required(true),
        ),
    ]);

    command
        .create_response(&ctx.http, CreateInteractionResponse::Modal(modal))
        .await?;

    Ok(())
}

pub async fn handle_modal<S: ReminderStorage>(
    ctx: &Context,
    modal: &ModalInteraction,
    scheduler: &Arc<ReminderScheduler<S>>,
) -> anyhow::Result<()> {
    if modal.data.custom_id != REMINDER_MODAL_ID {
        return Ok(());
    }

    let kind = match modal_field(modal, "type").as_deref() {
        Some("time") => WhenKind::Minutes,
        _ => WhenKind::Date,
    };
    let when = modal_field(modal, "when").unwrap_or_default();
    let embed = modal_field(modal, "embed").unwrap_or_default();
    let pinged = modal_field(modal, "pinged")
        .map(|raw| raw.to_lowercase() != "false")
        .unwrap_or(true);

    let result = scheduler
        .schedule(ScheduleRequest {
            user_id: modal.user.id.get() as i64,
            channel_id: modal.channel_id.get() as i64,
            guild_id: modal.guild_id.map(|id| id.get() as i64).unwrap_or_default(),
            kind,
            when,
            payload: ReminderPayload::Embed(embed),
            pinged,
        })
        .await;

    let text = match result {
        Ok(_) => "Embed reminder saved",
        Err(ScheduleError::InvalidDuration) => "Invalid minutes",
        Err(ScheduleError::InvalidPayload) => "Invalid JSON",
        Err(ScheduleError::InvalidFormat | ScheduleError::PastInstant) => "Invalid date",
        Err(ScheduleError::Storage(err)) => {
            log::error!("Storing an embed reminder failed: {err:#}");

            "Could not save the reminder, try again later"
        }
    };

    modal
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(text)
                    .ephemeral(true),
            ),
        )
        .await?;

    Ok(())
}

fn command_error_text(err: &ScheduleError) -> &'static str {
    match err {
        ScheduleError::InvalidDuration => "Invalid minutes",
        ScheduleError::InvalidFormat => "Invalid date format",
        ScheduleError::PastInstant => "Date is in the past",
        ScheduleError::InvalidPayload => "Invalid JSON",
        ScheduleError::Storage(_) => "Could not save the reminder, try again later",
    }
}

async fn reply(
    ctx: &Context,
    command: &CommandInteraction,
    text: &str,
    ephemeral: bool,
) -> anyhow::Result<()> {
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(text)
                    .ephemeral(ephemeral),
            ),
        )
        .await?;

    Ok(())
}

fn str_option<'a>(options: &'a [CommandDataOption], name: &str) -> Option<&'a str> {
    options
        .iter()
        .find(|option| option.name == name)
        .and_then(|option| option.value.as_str())
}

fn bool_option(options: &[CommandDataOption], name: &str) -> Option<bool> {
    options
        .iter()
        .find(|option| option.name == name)
        .and_then(|option| option.value.as_bool())
}

fn modal_field(modal: &ModalInteraction, id: &str) -> Option<String> {
    modal
        .data
        .components
        .iter()
        .flat_map(|row| row.components.iter())
        .find_map(|component| match component {
            ActionRowComponent::InputText(input) if input.custom_id == id => {
                input.value.clone().filter(|value| !value.is_empty())
            }
            _ => None,
        })
}
