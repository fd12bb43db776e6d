#![allow(dead_code)]

use async_trait::async_trait;
use pingrelay::core::config::AppConfig;
use pingrelay::errors::RelayError;
use pingrelay::slack::ChatApi;
use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Post { channel: String, text: String },
    React { channel: String, ts: String, name: String },
}

/// Records every outbound call in order and fails on request.
#[derive(Default)]
pub struct RecordingChat {
    pub calls: Mutex<Vec<Call>>,
    pub fail_post: bool,
    pub fail_reaction: bool,
}

impl RecordingChat {
    pub fn failing_post() -> Self {
        Self {
            fail_post: true,
            ..Self::default()
        }
    }

    pub fn failing_reaction() -> Self {
        Self {
            fail_reaction: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatApi for RecordingChat {
    async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), RelayError> {
        self.calls.lock().unwrap().push(Call::Post {
            channel: channel_id.to_string(),
            text: text.to_string(),
        });
        if self.fail_post {
            return Err(RelayError::ApiError("channel_not_found".to_string()));
        }
        Ok(())
    }

    async fn add_reaction(
        &self,
        channel_id: &str,
        ts: &str,
        name: &str,
    ) -> Result<(), RelayError> {
        self.calls.lock().unwrap().push(Call::React {
            channel: channel_id.to_string(),
            ts: ts.to_string(),
            name: name.to_string(),
        });
        if self.fail_reaction {
            return Err(RelayError::ApiError("already_reacted".to_string()));
        }
        Ok(())
    }
}

pub fn config() -> AppConfig {
    AppConfig {
        app_token: "xapp-test".to_string(),
        bot_token: "xoxb-test".to_string(),
        bot_user_id: "UBOT".to_string(),
        trigger: "@oncall".to_string(),
        notification_channel_id: "CNOTIFY".to_string(),
        workspace: "acme".to_string(),
        reaction: "ack".to_string(),
        debug: false,
    }
}
