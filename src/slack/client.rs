//! Slack Web API client module
//!
//! The relay only ever posts a message and adds a reaction. Both go through
//! the [`ChatApi`] trait so the notifier can be driven by a fake in tests.

use async_trait::async_trait;
use slack_morphism::hyper_tokio::{SlackClientHyperConnector, SlackHyperClient};
use slack_morphism::prelude::{SlackApiChatPostMessageRequest, SlackApiReactionsAddRequest};
use slack_morphism::{
    SlackApiToken, SlackApiTokenValue, SlackChannelId, SlackMessageContent, SlackReactionName,
    SlackTs,
};
use tracing::debug;

use crate::errors::RelayError;

/// Outbound chat operations used by the notifier.
#[async_trait]
pub trait ChatApi: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the message could not be posted.
    async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), RelayError>;

    /// # Errors
    ///
    /// Returns an error if the reaction could not be added.
    async fn add_reaction(&self, channel_id: &str, ts: &str, name: &str)
    -> Result<(), RelayError>;
}

/// Slack Web API client authenticated with the bot token.
pub struct SlackClient {
    client: SlackHyperClient,
    token: SlackApiToken,
}

impl SlackClient {
    /// # Errors
    ///
    /// Returns an error if the HTTPS connector cannot be built.
    pub fn new(token: String) -> Result<Self, RelayError> {
        let connector = SlackClientHyperConnector::new().map_err(|e| {
            RelayError::HttpError(format!("Failed to create Slack HTTP connector: {e}"))
        })?;

        Ok(Self {
            client: SlackHyperClient::new(connector),
            token: SlackApiToken::new(SlackApiTokenValue::new(token)),
        })
    }
}

#[async_trait]
impl ChatApi for SlackClient {
    async fn post_message(&self, channel_id: &str, text: &str) -> Result<(), RelayError> {
        let session = self.client.open_session(&self.token);

        let post_req = SlackApiChatPostMessageRequest::new(
            SlackChannelId(channel_id.to_string()),
            SlackMessageContent::new().with_text(text.to_string()),
        );

        let resp = session.chat_post_message(&post_req).await?;
        debug!(channel = %resp.channel.0, ts = %resp.ts.0, "posted notification");
        Ok(())
    }

    async fn add_reaction(
        &self,
        channel_id: &str,
        ts: &str,
        name: &str,
    ) -> Result<(), RelayError> {
        let session = self.client.open_session(&self.token);

        let reaction_req = SlackApiReactionsAddRequest::new(
            SlackChannelId(channel_id.to_string()),
            SlackReactionName(name.to_string()),
            SlackTs(ts.to_string()),
        );

        session.reactions_add(&reaction_req).await?;
        Ok(())
    }
}
