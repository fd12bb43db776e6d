//! Socket Mode wire types and the events handed to the relay loop.
//!
//! Socket Mode frames are JSON envelopes. `hello` and `disconnect` describe
//! the connection itself, `events_api` wraps an Events API callback whose
//! inner `event` is what the notifier looks at.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::core::models::MessageEvent;
use crate::errors::RelayError;

/// One item on the queue between the transport and the relay loop.
#[derive(Debug, Clone, PartialEq)]
pub enum SocketEvent {
    Connecting,
    Connected,
    /// The transport gave up; nothing more will arrive.
    ConnectionError(String),
    EventsApi {
        envelope_id: String,
        payload: Value,
    },
    /// An envelope type this relay does not handle (slash commands, interactivity).
    Unknown {
        envelope_id: Option<String>,
        envelope_type: String,
    },
}

/// Raw Socket Mode envelope as it arrives on the WebSocket.
#[derive(Debug, Clone, Deserialize)]
pub struct SocketModeEnvelope {
    #[serde(default)]
    pub envelope_id: Option<String>,
    #[serde(rename = "type")]
    pub envelope_type: String,
    #[serde(default)]
    pub payload: Option<Value>,
    /// Set on `disconnect` envelopes (`refresh_requested`, `warning`, ...).
    #[serde(default)]
    pub reason: Option<String>,
}

/// Envelope after sorting by type.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    Hello,
    Disconnect { reason: Option<String> },
    Event(SocketEvent),
}

impl From<SocketModeEnvelope> for Envelope {
    fn from(envelope: SocketModeEnvelope) -> Self {
        match (envelope.envelope_type.as_str(), envelope.envelope_id) {
            ("hello", _) => Envelope::Hello,
            ("disconnect", _) => Envelope::Disconnect {
                reason: envelope.reason,
            },
            ("events_api", Some(envelope_id)) => Envelope::Event(SocketEvent::EventsApi {
                envelope_id,
                payload: envelope.payload.unwrap_or(Value::Null),
            }),
            (_, envelope_id) => Envelope::Event(SocketEvent::Unknown {
                envelope_id,
                envelope_type: envelope.envelope_type,
            }),
        }
    }
}

/// Decode one text frame from the Socket Mode WebSocket.
///
/// # Errors
///
/// Returns `RelayError::ParseError` if the frame is not a Socket Mode envelope.
pub fn parse_envelope(frame: &str) -> Result<Envelope, RelayError> {
    let envelope: SocketModeEnvelope = serde_json::from_str(frame)?;
    Ok(envelope.into())
}

/// Acknowledgement written back for an envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocketModeAck {
    pub envelope_id: String,
}

impl SocketModeAck {
    pub fn new(envelope_id: impl Into<String>) -> Self {
        Self {
            envelope_id: envelope_id.into(),
        }
    }
}

/// The inner event of an Events API callback.
#[derive(Debug, Clone, PartialEq)]
pub enum InnerEvent {
    Message(MessageEvent),
    Other(String),
}

#[derive(Debug, Deserialize)]
struct EventCallback {
    event: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMessage {
    #[serde(rename = "type", default)]
    event_type: String,
    #[serde(default)]
    user: Option<String>,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    thread_ts: Option<String>,
    #[serde(default)]
    message: Option<Box<RawMessage>>,
    #[serde(default)]
    previous_message: Option<Box<RawMessage>>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Extract the inner event from an `events_api` payload.
///
/// `message_changed` edits are flattened into a single [`MessageEvent`] that
/// carries the edited message plus the text it replaced.
///
/// # Errors
///
/// Returns `RelayError::ParseError` if the payload has no inner event or the
/// message lacks a channel or timestamp.
pub fn parse_inner_event(payload: &Value) -> Result<InnerEvent, RelayError> {
    let callback = EventCallback::deserialize(payload)?;
    let event = callback
        .event
        .ok_or_else(|| RelayError::ParseError("payload has no inner event".to_string()))?;
    let raw = RawMessage::deserialize(&event)?;

    if raw.event_type != "message" {
        return Ok(InnerEvent::Other(raw.event_type));
    }

    let channel = non_empty(raw.channel)
        .ok_or_else(|| RelayError::ParseError("message event has no channel".to_string()))?;

    let message = match (raw.message, raw.previous_message) {
        (Some(current), Some(previous)) => {
            let ts = non_empty(current.ts)
                .or_else(|| non_empty(raw.ts))
                .ok_or_else(|| RelayError::ParseError("edited message has no ts".to_string()))?;
            MessageEvent {
                user: current.user.unwrap_or_default(),
                channel,
                text: current.text.unwrap_or_default(),
                ts,
                thread_ts: non_empty(current.thread_ts),
                previous_text: Some(previous.text.unwrap_or_default()),
            }
        }
        _ => MessageEvent {
            user: raw.user.unwrap_or_default(),
            channel,
            text: raw.text.unwrap_or_default(),
            ts: non_empty(raw.ts)
                .ok_or_else(|| RelayError::ParseError("message event has no ts".to_string()))?,
            thread_ts: non_empty(raw.thread_ts),
            previous_text: None,
        },
    };

    Ok(InnerEvent::Message(message))
}
