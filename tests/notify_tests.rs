mod support;

use pingrelay::core::models::{Decision, MessageEvent, SkipReason};
use pingrelay::features::{Notifier, classify, compose, forward};
use serde_json::json;
use support::{Call, RecordingChat, config};

fn message(user: &str, text: &str) -> MessageEvent {
    MessageEvent {
        user: user.to_string(),
        channel: "C1".to_string(),
        text: text.to_string(),
        ts: "100".to_string(),
        thread_ts: None,
        previous_text: None,
    }
}

fn edit(previous: &str, current: &str) -> MessageEvent {
    MessageEvent {
        previous_text: Some(previous.to_string()),
        ..message("U1", current)
    }
}

#[test]
fn scenario_trigger_in_plain_message_is_forwarded() {
    let msg = message("U1", "hey @oncall need help");
    assert_eq!(classify(&msg, "UBOT", "@oncall"), Decision::Forward);

    let notification = compose(&msg, "acme");
    assert!(notification.text.contains("<@U1>"));
    assert!(notification.text.contains("> hey @oncall need help"));
    assert!(
        notification
            .text
            .contains("https://acme.slack.com/archives/C1/p100")
    );
    assert_eq!(
        notification.text,
        "Message from <@U1>\n> hey @oncall need help\n\n*link:* https://acme.slack.com/archives/C1/p100"
    );
}

#[test]
fn scenario_own_message_is_ignored() {
    let msg = message("UBOT", "hey @oncall need help");
    assert_eq!(
        classify(&msg, "UBOT", "@oncall"),
        Decision::Ignore(SkipReason::OwnMessage)
    );
}

#[test]
fn scenario_edit_introducing_trigger_is_forwarded() {
    let msg = edit("no mention here", "now has @oncall");
    assert_eq!(classify(&msg, "UBOT", "@oncall"), Decision::Forward);
}

#[test]
fn scenario_edit_keeping_trigger_is_ignored() {
    let msg = edit("@oncall already here", "@oncall still here, typo fixed");
    assert!(matches!(
        classify(&msg, "UBOT", "@oncall"),
        Decision::Ignore(_)
    ));
}

#[test]
fn message_without_trigger_is_ignored() {
    let msg = message("U1", "lunch anyone?");
    assert_eq!(
        classify(&msg, "UBOT", "@oncall"),
        Decision::Ignore(SkipReason::NoTrigger)
    );
}

#[test]
fn compose_quotes_every_line_and_links_into_thread() {
    let msg = MessageEvent {
        thread_ts: Some("90.5".to_string()),
        ..message("U2", "first @oncall\nsecond\nthird")
    };

    let notification = compose(&msg, "acme");
    assert!(
        notification
            .text
            .contains("> first @oncall\n> second\n> third")
    );
    assert_eq!(
        notification.permalink,
        "https://acme.slack.com/archives/C1/p100?thread_ts=90.5"
    );
    assert!(notification.text.ends_with(&notification.permalink));
}

#[tokio::test]
async fn forward_posts_then_reacts_on_original() {
    let chat = RecordingChat::default();
    let msg = message("U1", "hey @oncall");
    let notification = compose(&msg, "acme");

    assert!(forward(&chat, "CNOTIFY", "ack", &notification, &msg).await);
    assert_eq!(
        chat.calls(),
        vec![
            Call::Post {
                channel: "CNOTIFY".to_string(),
                text: notification.text.clone(),
            },
            Call::React {
                channel: "C1".to_string(),
                ts: "100".to_string(),
                name: "ack".to_string(),
            },
        ]
    );
}

#[tokio::test]
async fn forward_stops_when_post_fails() {
    let chat = RecordingChat::failing_post();
    let msg = message("U1", "hey @oncall");
    let notification = compose(&msg, "acme");

    assert!(!forward(&chat, "CNOTIFY", "ack", &notification, &msg).await);
    let calls = chat.calls();
    assert_eq!(calls.len(), 1);
    assert!(matches!(calls[0], Call::Post { .. }));
}

#[tokio::test]
async fn forward_succeeds_when_only_reaction_fails() {
    let chat = RecordingChat::failing_reaction();
    let msg = message("U1", "hey @oncall");
    let notification = compose(&msg, "acme");

    assert!(forward(&chat, "CNOTIFY", "ack", &notification, &msg).await);
    assert_eq!(chat.calls().len(), 2);
}

#[tokio::test]
async fn notifier_acks_payloads_it_cannot_use() {
    let config = config();
    let chat = RecordingChat::default();
    let notifier = Notifier::new(&config, &chat);

    assert!(notifier.handle_events_api(&json!(null)).await);
    assert!(
        notifier
            .handle_events_api(&json!({"event": {"type": "reaction_added"}}))
            .await
    );
    assert!(
        notifier
            .handle_events_api(&json!({"event": {"type": "message", "text": "@oncall"}}))
            .await
    );
    assert!(chat.calls().is_empty());
}

#[tokio::test]
async fn notifier_forwards_with_configured_reaction() {
    let mut config = config();
    config.reaction = ":eyes:".to_string();
    let chat = RecordingChat::default();
    let notifier = Notifier::new(&config, &chat);

    let payload = json!({
        "type": "event_callback",
        "event": {
            "type": "message",
            "user": "U1",
            "channel": "C1",
            "text": "hey @oncall need help",
            "ts": "100"
        }
    });

    assert!(notifier.handle_events_api(&payload).await);
    assert_eq!(
        chat.calls()[1],
        Call::React {
            channel: "C1".to_string(),
            ts: "100".to_string(),
            name: "eyes".to_string(),
        }
    );
}

#[tokio::test]
async fn notifier_reports_failed_post() {
    let config = config();
    let chat = RecordingChat::failing_post();
    let notifier = Notifier::new(&config, &chat);

    let payload = json!({"event": {
        "type": "message", "user": "U1", "channel": "C1",
        "text": "@oncall", "ts": "100"
    }});

    assert!(!notifier.handle_events_api(&payload).await);
}

#[tokio::test]
async fn notifier_ignores_bot_without_calls() {
    let config = config();
    let chat = RecordingChat::default();
    let notifier = Notifier::new(&config, &chat);

    let payload = json!({"event": {
        "type": "message", "user": "UBOT", "channel": "C1",
        "text": "hey @oncall need help", "ts": "100"
    }});

    assert!(notifier.handle_events_api(&payload).await);
    assert!(chat.calls().is_empty());
}
