//! The single consumer loop between the Socket Mode transport and the notifier.

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use super::notify::Notifier;
use crate::errors::RelayError;
use crate::slack::ChatApi;
use crate::slack::events::{SocketEvent, SocketModeAck};

/// Drain `events` in delivery order, one event at a time.
///
/// Returns only on a fatal condition: the transport reported a connection
/// error, or the event queue closed.
///
/// # Errors
///
/// Always returns `RelayError::ConnectionError` describing why the loop stopped.
pub async fn run_relay<C: ChatApi + ?Sized>(
    notifier: &Notifier<'_, C>,
    mut events: UnboundedReceiver<SocketEvent>,
    acks: &UnboundedSender<SocketModeAck>,
) -> Result<(), RelayError> {
    while let Some(event) = events.recv().await {
        match event {
            SocketEvent::Connecting => info!("connecting to slack with socket mode"),
            SocketEvent::Connected => info!("connected"),
            SocketEvent::ConnectionError(reason) => {
                error!("received connection error: {}", reason);
                return Err(RelayError::ConnectionError(reason));
            }
            SocketEvent::EventsApi {
                envelope_id,
                payload,
            } => {
                if notifier.handle_events_api(&payload).await {
                    send_ack(acks, envelope_id);
                } else {
                    warn!(envelope_id = %envelope_id, "leaving envelope unacknowledged");
                }
            }
            SocketEvent::Unknown {
                envelope_id,
                envelope_type,
            } => {
                debug!(envelope_type = %envelope_type, "ignoring envelope");
                if let Some(id) = envelope_id {
                    send_ack(acks, id);
                }
            }
        }
    }

    Err(RelayError::ConnectionError(
        "socket mode event stream closed".to_string(),
    ))
}

fn send_ack(acks: &UnboundedSender<SocketModeAck>, envelope_id: String) {
    if acks.send(SocketModeAck::new(envelope_id)).is_err() {
        warn!("socket mode transport is gone; acknowledgement dropped");
    }
}
