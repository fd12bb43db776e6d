//! All Slack-specific functionality

pub mod client;
pub mod events;
pub mod socket;

// Re-export main types for convenience
pub use client::{ChatApi, SlackClient};
pub use events::{SocketEvent, SocketModeAck};
pub use socket::{SocketModeClient, SocketOptions};
