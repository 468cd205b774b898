use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::TimeDelta;
use serde_json::json;
use wecker_models::reminder::ChannelId;
use wecker_storage::{InMemoryReminderStorage, NewReminder};

use super::*;
use crate::schedule::{ReminderScheduler, ScheduleRequest, WhenKind};

type SentMessages = Arc<Mutex<Vec<(ChannelId, OutgoingReminder)>>>;

#[derive(Default)]
struct TestDeliveryChannel {
    sent: SentMessages,
    dead_channels: Vec<ChannelId>,
    reject_embeds: bool,
}

#[async_trait]
impl ReminderDeliveryChannel for TestDeliveryChannel {
    async fn send_reminder(
        &self,
        channel_id: ChannelId,
        message: OutgoingReminder,
    ) -> Result<(), DeliveryError> {
        if self.dead_channels.contains(&channel_id) {
            return Err(DeliveryError::DestinationUnavailable(channel_id));
        }
        if self.reject_embeds && matches!(message, OutgoingReminder::Embeds { .. }) {
            return Err(DeliveryError::PayloadRejected);
        }
        self.sent.lock().unwrap().push((channel_id, message));

        Ok(())
    }
}

struct TestContext {
    storage: Arc<InMemoryReminderStorage>,
    dispatcher: ReminderDispatcher<InMemoryReminderStorage>,
    sent: SentMessages,
}

fn context(channel: TestDeliveryChannel) -> TestContext {
    let sent = channel.sent.clone();
    let storage = Arc::new(InMemoryReminderStorage::new());
    let dispatcher = ReminderDispatcher::new(storage.clone(), Arc::new(channel));

    TestContext {
        storage,
        dispatcher,
        sent,
    }
}

fn due_reminder(channel_id: ChannelId, payload: ReminderPayload, pinged: bool) -> NewReminder {
    NewReminder {
        user_id: 77,
        channel_id,
        guild_id: 1,
        payload,
        remind_at: Utc::now() - TimeDelta::minutes(1),
        pinged,
    }
}

#[tokio::test]
async fn due_text_reminders_are_delivered_with_a_mention_and_removed() {
    let ctx = context(TestDeliveryChannel::default());
    ctx.storage
        .insert(due_reminder(
            5,
            ReminderPayload::Text("drink water".to_owned()),
            true,
        ))
        .await
        .unwrap();

    ctx.dispatcher.sweep(Utc::now()).await.unwrap();

    let sent = ctx.sent.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec![(5, OutgoingReminder::Text("<@77> drink water".to_owned()))]
    );
    assert!(ctx.storage.find_due(Utc::now()).await.unwrap().is_empty());
}

#[tokio::test]
async fn unpinged_reminders_come_without_a_mention() {
    let ctx = context(TestDeliveryChannel::default());
    ctx.storage
        .insert(due_reminder(
            5,
            ReminderPayload::Text("quali starts".to_owned()),
            false,
        ))
        .await
        .unwrap();

    ctx.dispatcher.sweep(Utc::now()).await.unwrap();

    let sent = ctx.sent.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec![(5, OutgoingReminder::Text("quali starts".to_owned()))]
    );
}

#[tokio::test]
async fn reminders_that_are_not_due_yet_stay_stored() {
    let ctx = context(TestDeliveryChannel::default());
    let mut reminder = due_reminder(5, ReminderPayload::Text("later".to_owned()), true);
    reminder.remind_at = Utc::now() + TimeDelta::minutes(5);
    ctx.storage.insert(reminder).await.unwrap();

    ctx.dispatcher.sweep(Utc::now()).await.unwrap();

    assert!(ctx.sent.lock().unwrap().is_empty());
    let later = Utc::now() + TimeDelta::minutes(6);
    assert_eq!(ctx.storage.find_due(later).await.unwrap().len(), 1);
}

#[tokio::test]
async fn every_embed_wrapper_form_normalizes_to_a_sequence() {
    let ctx = context(TestDeliveryChannel::default());
    let wrapper_list = json!({"embeds": [{"title": "one"}, {"title": "two"}]});
    let wrapper_single = json!({"embed": {"title": "wrapped"}});
    let bare = json!({"title": "bare"});
    for payload in [&wrapper_list, &wrapper_single, &bare] {
        ctx.storage
            .insert(due_reminder(
                5,
                ReminderPayload::Embed(payload.to_string()),
                false,
            ))
            .await
            .unwrap();
    }

    ctx.dispatcher.sweep(Utc::now()).await.unwrap();

    let sent = ctx.sent.lock().unwrap().clone();
    let embeds: Vec<_> = sent
        .iter()
        .map(|(_, message)| match message {
            OutgoingReminder::Embeds { embeds, .. } => embeds.clone(),
            other => panic!("expected embeds, got {other:?}"),
        })
        .collect();
    assert_eq!(
        embeds,
        vec![
            vec![json!({"title": "one"}), json!({"title": "two"})],
            vec![json!({"title": "wrapped"})],
            vec![json!({"title": "bare"})],
        ]
    );
}

#[tokio::test]
async fn pinged_embeds_carry_the_mention_as_content() {
    let ctx = context(TestDeliveryChannel::default());
    ctx.storage
        .insert(due_reminder(
            5,
            ReminderPayload::Embed(json!({"title": "race"}).to_string()),
            true,
        ))
        .await
        .unwrap();

    ctx.dispatcher.sweep(Utc::now()).await.unwrap();

    let sent = ctx.sent.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec![(
            5,
            OutgoingReminder::Embeds {
                content: Some("<@77>".to_owned()),
                embeds: vec![json!({"title": "race"})],
            }
        )]
    );
}

#[tokio::test]
async fn corrupted_embed_payloads_fall_back_to_verbatim_text() {
    let ctx = context(TestDeliveryChannel::default());
    ctx.storage
        .insert(due_reminder(
            5,
            ReminderPayload::Embed("{not json".to_owned()),
            true,
        ))
        .await
        .unwrap();

    ctx.dispatcher.sweep(Utc::now()).await.unwrap();

    let sent = ctx.sent.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec![(5, OutgoingReminder::Text("<@77> {not json".to_owned()))]
    );
    assert!(ctx.storage.find_due(Utc::now()).await.unwrap().is_empty());
}

#[tokio::test]
async fn embeds_rejected_by_the_platform_are_resent_as_text() {
    let ctx = context(TestDeliveryChannel {
        reject_embeds: true,
        ..TestDeliveryChannel::default()
    });
    let payload = json!({"title": "race"}).to_string();
    ctx.storage
        .insert(due_reminder(5, ReminderPayload::Embed(payload.clone()), false))
        .await
        .unwrap();

    ctx.dispatcher.sweep(Utc::now()).await.unwrap();

    let sent = ctx.sent.lock().unwrap().clone();
    assert_eq!(sent, vec![(5, OutgoingReminder::Text(payload))]);
}

#[tokio::test]
async fn an_unresolvable_channel_still_removes_the_record() {
    let ctx = context(TestDeliveryChannel {
        dead_channels: vec![5],
        ..TestDeliveryChannel::default()
    });
    ctx.storage
        .insert(due_reminder(
            5,
            ReminderPayload::Text("into the void".to_owned()),
            true,
        ))
        .await
        .unwrap();

    ctx.dispatcher.sweep(Utc::now()).await.unwrap();

    assert!(ctx.sent.lock().unwrap().is_empty());
    assert!(ctx.storage.find_due(Utc::now()).await.unwrap().is_empty());
}

#[tokio::test]
async fn one_dead_channel_does_not_stop_the_batch() {
    let ctx = context(TestDeliveryChannel {
        dead_channels: vec![5],
        ..TestDeliveryChannel::default()
    });
    ctx.storage
        .insert(due_reminder(
            5,
            ReminderPayload::Text("lost".to_owned()),
            false,
        ))
        .await
        .unwrap();
    ctx.storage
        .insert(due_reminder(
            6,
            ReminderPayload::Text("delivered".to_owned()),
            false,
        ))
        .await
        .unwrap();

    ctx.dispatcher.sweep(Utc::now()).await.unwrap();

    let sent = ctx.sent.lock().unwrap().clone();
    assert_eq!(sent, vec![(6, OutgoingReminder::Text("delivered".to_owned()))]);
    assert!(ctx.storage.find_due(Utc::now()).await.unwrap().is_empty());
}

#[tokio::test]
async fn a_scheduled_relative_reminder_fires_exactly_once() {
    let ctx = context(TestDeliveryChannel::default());
    let scheduler = ReminderScheduler::new(ctx.storage.clone());
    scheduler
        .schedule(ScheduleRequest {
            user_id: 77,
            channel_id: 5,
            guild_id: 1,
            kind: WhenKind::Minutes,
            when: "1".to_owned(),
            payload: ReminderPayload::Text("tea is ready".to_owned()),
            pinged: true,
        })
        .await
        .unwrap();

    ctx.dispatcher.sweep(Utc::now()).await.unwrap();
    assert!(ctx.sent.lock().unwrap().is_empty());

    let after_due = Utc::now() + TimeDelta::minutes(2);
    ctx.dispatcher.sweep(after_due).await.unwrap();
    ctx.dispatcher.sweep(after_due).await.unwrap();

    let sent = ctx.sent.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec![(5, OutgoingReminder::Text("<@77> tea is ready".to_owned()))]
    );
    assert!(ctx.storage.find_due(after_due).await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn the_spawned_dispatcher_sweeps_on_its_own() {
    let ctx = context(TestDeliveryChannel::default());
    ctx.storage
        .insert(due_reminder(
            5,
            ReminderPayload::Text("tick".to_owned()),
            false,
        ))
        .await
        .unwrap();

    let handle = ctx.dispatcher.spawn();
    tokio::time::sleep(std::time::Duration::from_secs(1)).await;

    assert_eq!(ctx.sent.lock().unwrap().len(), 1);

    handle.shutdown().await;
}
