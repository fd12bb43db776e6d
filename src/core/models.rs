/// A chat message observed on the workspace, normalised from an Events API payload.
///
/// Edits arrive as `message_changed` events; they are flattened so that `user`,
/// `text`, `ts` and `thread_ts` describe the message as it reads after the
/// edit, and `previous_text` carries the body it had before.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageEvent {
    pub user: String,
    pub channel: String,
    pub text: String,
    pub ts: String,
    pub thread_ts: Option<String>,
    pub previous_text: Option<String>,
}

impl MessageEvent {
    #[must_use]
    pub fn is_edit(&self) -> bool {
        self.previous_text.is_some()
    }

    /// Thread timestamp, if the message belongs to a thread.
    #[must_use]
    pub fn thread(&self) -> Option<&str> {
        self.thread_ts.as_deref().filter(|ts| !ts.is_empty())
    }
}

/// Outcome of checking a message against the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Forward,
    Ignore(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    OwnMessage,
    EditAlreadyTriggered,
    NoTrigger,
}

impl SkipReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SkipReason::OwnMessage => "message user is the bot",
            SkipReason::EditAlreadyTriggered => "edit did not introduce the trigger",
            SkipReason::NoTrigger => "trigger not present",
        }
    }
}

/// Text posted to the notification channel for one forwarded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub text: String,
    pub permalink: String,
}
