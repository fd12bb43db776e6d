use anyhow::Result;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info};

use pingrelay::core::config::AppConfig;
use pingrelay::features::{Notifier, run_relay};
use pingrelay::slack::{SlackClient, SocketModeClient};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::parse();
    pingrelay::setup_logging(config.debug);

    config.validate().map_err(|e| {
        error!("Config error: {}", e);
        e
    })?;
    info!(
        workspace = %config.workspace,
        notification_channel = %config.notification_channel_id,
        "starting relay"
    );

    let client = SlackClient::new(config.bot_token.clone())?;
    let socket = SocketModeClient::new(config.app_token.clone())?;

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (acks_tx, acks_rx) = mpsc::unbounded_channel();
    let transport = tokio::spawn(socket.run(events_tx, acks_rx));

    let notifier = Notifier::new(&config, &client);
    let result = run_relay(&notifier, events_rx, &acks_tx).await;

    transport.abort();
    result?;
    Ok(())
}
