//! Trigger detection and forwarding.

use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::core::config::AppConfig;
use crate::core::models::{Decision, MessageEvent, Notification, SkipReason};
use crate::slack::ChatApi;
use crate::slack::events::{InnerEvent, parse_inner_event};

/// Decide whether a message should be forwarded.
///
/// An edit is forwarded only when it introduces the trigger, so fixing a typo
/// in an already-relayed message does not notify twice.
#[must_use]
pub fn classify(event: &MessageEvent, bot_user_id: &str, trigger: &str) -> Decision {
    if event.user == bot_user_id {
        return Decision::Ignore(SkipReason::OwnMessage);
    }

    if let Some(previous) = &event.previous_text {
        if event.text.contains(trigger) && !previous.contains(trigger) {
            return Decision::Forward;
        }
        return Decision::Ignore(SkipReason::EditAlreadyTriggered);
    }

    if event.text.contains(trigger) {
        Decision::Forward
    } else {
        Decision::Ignore(SkipReason::NoTrigger)
    }
}

/// Prefix every line of `text` with a Slack block-quote marker.
#[must_use]
pub fn quote(text: &str) -> String {
    format!("> {}", text.replace('\n', "\n> "))
}

/// Link back to the original message, pointing into its thread when it has one.
#[must_use]
pub fn permalink(workspace: &str, channel: &str, ts: &str, thread_ts: Option<&str>) -> String {
    let link = format!("https://{workspace}.slack.com/archives/{channel}/p{ts}");
    match thread_ts.filter(|t| !t.is_empty()) {
        Some(thread) => format!("{link}?thread_ts={thread}"),
        None => link,
    }
}

#[must_use]
pub fn compose(event: &MessageEvent, workspace: &str) -> Notification {
    let permalink = permalink(workspace, &event.channel, &event.ts, event.thread());
    let text = format!(
        "Message from <@{}>\n{}\n\n*link:* {}",
        event.user,
        quote(&event.text),
        permalink
    );
    Notification { text, permalink }
}

/// Post `notification` and mark the original message with `reaction`.
///
/// Returns `false` only when the post fails; the reaction is best effort and
/// is not attempted unless the post went through.
pub async fn forward<C: ChatApi + ?Sized>(
    client: &C,
    notification_channel_id: &str,
    reaction: &str,
    notification: &Notification,
    original: &MessageEvent,
) -> bool {
    if let Err(e) = client
        .post_message(notification_channel_id, &notification.text)
        .await
    {
        error!("failed posting notification: {}", e);
        return false;
    }

    if let Err(e) = client
        .add_reaction(&original.channel, &original.ts, reaction)
        .await
    {
        error!("failed sending reaction: {}", e);
    }

    true
}

/// Evaluates Events API payloads against the configured trigger.
pub struct Notifier<'a, C: ChatApi + ?Sized> {
    config: &'a AppConfig,
    client: &'a C,
}

impl<'a, C: ChatApi + ?Sized> Notifier<'a, C> {
    pub fn new(config: &'a AppConfig, client: &'a C) -> Self {
        Self { config, client }
    }

    /// Handle one `events_api` payload.
    ///
    /// The return value is the transport acknowledgement: `false` leaves the
    /// envelope unacknowledged so Slack redelivers it.
    pub async fn handle_events_api(&self, payload: &Value) -> bool {
        let message = match parse_inner_event(payload) {
            Ok(InnerEvent::Message(message)) => message,
            Ok(InnerEvent::Other(event_type)) => {
                debug!(event_type = %event_type, "unexpected type for message event");
                return true;
            }
            Err(e) => {
                warn!("unexpected events api payload: {}", e);
                return true;
            }
        };

        match classify(&message, &self.config.bot_user_id, &self.config.trigger) {
            Decision::Ignore(reason) => {
                debug!(
                    reason = reason.as_str(),
                    channel = %message.channel,
                    ts = %message.ts,
                    text = %message.text,
                    "skipping message"
                );
                true
            }
            Decision::Forward => {
                info!(
                    channel = %message.channel,
                    ts = %message.ts,
                    user = %message.user,
                    edit = message.is_edit(),
                    "forwarding message"
                );
                let notification = compose(&message, &self.config.workspace);
                forward(
                    self.client,
                    &self.config.notification_channel_id,
                    self.config.reaction_name(),
                    &notification,
                    &message,
                )
                .await
            }
        }
    }
}
