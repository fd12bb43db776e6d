//! Socket Mode transport.
//!
//! Opens a WebSocket through `apps.connections.open`, pushes every envelope
//! onto an unbounded queue in arrival order, and writes acknowledgements back
//! only for the envelope ids the relay loop sends on the ack queue.
//!
//! A session that drops (server close, read or write error, missing pong) is
//! replaced after `reconnect_delay`, as is one Slack retires with a
//! `disconnect` envelope. Only failing to open a new session is reported, once,
//! as [`SocketEvent::ConnectionError`], after which the transport stops.

use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{WebSocketStream, connect_async};
use tracing::{debug, info, warn};
use url::Url;

use super::events::{Envelope, SocketEvent, SocketModeAck, parse_envelope};
use crate::errors::RelayError;

const CONNECTIONS_OPEN_URL: &str = "https://slack.com/api/apps.connections.open";

#[derive(Debug, Deserialize)]
struct ConnectionsOpenResponse {
    ok: bool,
    url: Option<String>,
    error: Option<String>,
}

/// Endpoint and timings for the Socket Mode transport.
#[derive(Debug, Clone)]
pub struct SocketOptions {
    /// `apps.connections.open` endpoint.
    pub connections_open_url: String,
    /// Delay before replacing a dropped session.
    pub reconnect_delay: Duration,
    /// Interval between client pings. A ping still unanswered at the next
    /// tick drops the session.
    pub ping_interval: Duration,
}

impl Default for SocketOptions {
    fn default() -> Self {
        Self {
            connections_open_url: CONNECTIONS_OPEN_URL.to_string(),
            reconnect_delay: Duration::from_secs(5),
            ping_interval: Duration::from_secs(30),
        }
    }
}

/// How a single WebSocket session ended.
#[derive(Debug)]
enum SessionEnd {
    /// Slack asked for a fresh connection.
    Reconnect,
    /// The connection was lost.
    Dropped(String),
    /// The relay loop dropped its ack sender.
    Finished,
}

enum FrameOutcome {
    Continue,
    Reconnect,
    ConsumerGone,
}

pub struct SocketModeClient {
    http: reqwest::Client,
    app_token: String,
    options: SocketOptions,
}

impl SocketModeClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(app_token: String) -> Result<Self, RelayError> {
        Self::with_options(app_token, SocketOptions::default())
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_options(app_token: String, options: SocketOptions) -> Result<Self, RelayError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            app_token,
            options,
        })
    }

    /// Run the transport until a session cannot be opened or the relay loop
    /// goes away.
    pub async fn run(
        self,
        events: UnboundedSender<SocketEvent>,
        mut acks: UnboundedReceiver<SocketModeAck>,
    ) {
        loop {
            if events.send(SocketEvent::Connecting).is_err() {
                return;
            }

            match self.connect_and_serve(&events, &mut acks).await {
                Ok(SessionEnd::Reconnect) => {
                    info!("reconnecting to slack with socket mode");
                }
                Ok(SessionEnd::Dropped(reason)) => {
                    warn!(
                        reason = %reason,
                        "socket mode session dropped, reconnecting in {:?}",
                        self.options.reconnect_delay
                    );
                    tokio::time::sleep(self.options.reconnect_delay).await;
                }
                Ok(SessionEnd::Finished) => return,
                Err(e) => {
                    let _ = events.send(SocketEvent::ConnectionError(e.to_string()));
                    return;
                }
            }
        }
    }

    /// Ask Slack for a Socket Mode WebSocket URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, Slack rejects the app token, or
    /// the response carries no usable `wss://` URL.
    pub async fn open_connection_url(&self) -> Result<Url, RelayError> {
        let resp = self
            .http
            .post(&self.options.connections_open_url)
            .bearer_auth(&self.app_token)
            .send()
            .await
            .map_err(|e| {
                RelayError::ConnectionError(format!("apps.connections.open request failed: {e}"))
            })?;

        if !resp.status().is_success() {
            return Err(RelayError::ConnectionError(format!(
                "apps.connections.open HTTP {}",
                resp.status()
            )));
        }

        let body: ConnectionsOpenResponse = resp.json().await.map_err(|e| {
            RelayError::ConnectionError(format!("apps.connections.open JSON parse error: {e}"))
        })?;

        parse_connection_url(body)
    }

    /// Open one session and serve it. Errors are failures to open.
    async fn connect_and_serve(
        &self,
        events: &UnboundedSender<SocketEvent>,
        acks: &mut UnboundedReceiver<SocketModeAck>,
    ) -> Result<SessionEnd, RelayError> {
        let url = self.open_connection_url().await?;
        let (ws_stream, _) = connect_async(url.as_str()).await?;
        Ok(serve_session(ws_stream, events, acks, self.options.ping_interval).await)
    }
}

async fn serve_session<S>(
    ws_stream: WebSocketStream<S>,
    events: &UnboundedSender<SocketEvent>,
    acks: &mut UnboundedReceiver<SocketModeAck>,
    ping_interval: Duration,
) -> SessionEnd
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let (mut write, mut read) = ws_stream.split();
    let mut heartbeat = interval_at(Instant::now() + ping_interval, ping_interval);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut awaiting_pong = false;

    loop {
        tokio::select! {
            frame = read.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => match handle_frame(&text, events) {
                    FrameOutcome::Continue => {}
                    FrameOutcome::Reconnect => return SessionEnd::Reconnect,
                    FrameOutcome::ConsumerGone => return SessionEnd::Finished,
                },
                Some(Ok(WsMessage::Ping(data))) => {
                    if let Err(e) = write.send(WsMessage::Pong(data)).await {
                        return SessionEnd::Dropped(format!("failed to send pong: {e}"));
                    }
                }
                Some(Ok(WsMessage::Pong(_))) => awaiting_pong = false,
                Some(Ok(WsMessage::Close(frame))) => {
                    return SessionEnd::Dropped(format!("socket closed by server: {frame:?}"));
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return SessionEnd::Dropped(e.to_string()),
                None => return SessionEnd::Dropped("socket stream ended".to_string()),
            },
            ack = acks.recv() => match ack {
                Some(ack) => match serde_json::to_string(&ack) {
                    Ok(body) => {
                        if let Err(e) = write.send(WsMessage::Text(body)).await {
                            return SessionEnd::Dropped(format!("failed to send ack: {e}"));
                        }
                        debug!(envelope_id = %ack.envelope_id, "acknowledged envelope");
                    }
                    Err(e) => warn!("Failed to encode acknowledgement: {}", e),
                },
                None => return SessionEnd::Finished,
            },
            _ = heartbeat.tick() => {
                if awaiting_pong {
                    return SessionEnd::Dropped("no pong within ping interval".to_string());
                }
                if let Err(e) = write.send(WsMessage::Ping(Vec::new())).await {
                    return SessionEnd::Dropped(format!("failed to send ping: {e}"));
                }
                awaiting_pong = true;
            }
        }
    }
}

fn parse_connection_url(body: ConnectionsOpenResponse) -> Result<Url, RelayError> {
    if !body.ok {
        return Err(RelayError::ConnectionError(format!(
            "apps.connections.open error: {}",
            body.error.as_deref().unwrap_or("unknown")
        )));
    }

    let raw = body.url.ok_or_else(|| {
        RelayError::ConnectionError("apps.connections.open returned no url".to_string())
    })?;
    let url = Url::parse(&raw)
        .map_err(|e| RelayError::ConnectionError(format!("invalid socket url: {e}")))?;

    if url.scheme() != "wss" && url.scheme() != "ws" {
        return Err(RelayError::ConnectionError(format!(
            "unexpected socket url scheme: {}",
            url.scheme()
        )));
    }

    Ok(url)
}

fn handle_frame(text: &str, events: &UnboundedSender<SocketEvent>) -> FrameOutcome {
    debug!(frame = %text, "socket mode frame");

    let event = match parse_envelope(text) {
        Ok(Envelope::Hello) => SocketEvent::Connected,
        Ok(Envelope::Disconnect { reason }) => {
            info!(
                reason = reason.as_deref().unwrap_or("unspecified"),
                "slack requested disconnect"
            );
            return FrameOutcome::Reconnect;
        }
        Ok(Envelope::Event(event)) => event,
        Err(e) => {
            warn!("Failed to parse Socket Mode envelope: {}", e);
            return FrameOutcome::Continue;
        }
    };

    if events.send(event).is_err() {
        return FrameOutcome::ConsumerGone;
    }
    FrameOutcome::Continue
}
