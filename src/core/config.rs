use clap::Parser;
use std::fmt;

use crate::errors::RelayError;

/// Relay configuration, parsed once at startup from flags or the environment.
#[derive(Clone, Parser)]
#[command(
    name = "pingrelay",
    version,
    about = "Forward Slack messages carrying a trigger token to a notification channel"
)]
pub struct AppConfig {
    /// Slack app-level token (xapp-...) used to open the Socket Mode connection
    #[arg(long, env = "SLACK_APP_TOKEN", default_value = "")]
    pub app_token: String,

    /// Slack bot token (xoxb-...) used for Web API calls
    #[arg(long, env = "SLACK_BOT_TOKEN", default_value = "")]
    pub bot_token: String,

    /// User ID of the bot itself; its own messages are never forwarded
    #[arg(long, env = "SLACK_BOT_USER_ID", default_value = "")]
    pub bot_user_id: String,

    /// Substring (usually a group mention) that marks a message for forwarding
    #[arg(long, env = "RELAY_TRIGGER", default_value = "")]
    pub trigger: String,

    /// Channel ID that receives forwarded notifications
    #[arg(long, env = "RELAY_NOTIFICATION_CHANNEL_ID", default_value = "")]
    pub notification_channel_id: String,

    /// Workspace subdomain, used to build message permalinks
    #[arg(long, env = "SLACK_WORKSPACE", default_value = "")]
    pub workspace: String,

    /// Reaction added to a message once it has been forwarded
    #[arg(long, env = "RELAY_REACTION", default_value = "ack")]
    pub reaction: String,

    /// Enable verbose diagnostic logging
    #[arg(long, env = "RELAY_DEBUG")]
    pub debug: bool,
}

impl AppConfig {
    /// Reject configurations the relay cannot run with.
    ///
    /// An empty trigger matches every message the bot can see and is refused.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::ConfigError` naming the first missing setting.
    pub fn validate(&self) -> Result<(), RelayError> {
        let required = [
            ("app-token", &self.app_token),
            ("bot-token", &self.bot_token),
            ("bot-user-id", &self.bot_user_id),
            ("trigger", &self.trigger),
            ("notification-channel-id", &self.notification_channel_id),
            ("workspace", &self.workspace),
        ];

        for (flag, value) in required {
            if value.trim().is_empty() {
                return Err(RelayError::ConfigError(format!("--{flag} must not be empty")));
            }
        }

        if self.reaction_name().is_empty() {
            return Err(RelayError::ConfigError(
                "--reaction must name an emoji".to_string(),
            ));
        }

        Ok(())
    }

    /// Reaction name without the surrounding colons Slack users tend to type.
    #[must_use]
    pub fn reaction_name(&self) -> &str {
        self.reaction.trim().trim_matches(':')
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("app_token", &"<redacted>")
            .field("bot_token", &"<redacted>")
            .field("bot_user_id", &self.bot_user_id)
            .field("trigger", &self.trigger)
            .field("notification_channel_id", &self.notification_channel_id)
            .field("workspace", &self.workspace)
            .field("reaction", &self.reaction)
            .field("debug", &self.debug)
            .finish()
    }
}
