//! pingrelay - forwards Slack messages that carry a trigger token.
//!
//! The relay listens on a Socket Mode connection, and whenever a message
//! contains the configured trigger (typically a group mention such as
//! `@oncall`) it posts a quoted copy with a permalink to a notification
//! channel and adds an acknowledgement reaction to the original message.
//!
//! # Architecture
//!
//! - `slack::socket` owns the WebSocket and produces [`slack::SocketEvent`]s
//!   onto an unbounded queue
//! - `features::relay` is the single consumer draining that queue in order
//! - `features::notify` decides per message and talks to Slack through the
//!   [`slack::ChatApi`] trait
//!
//! # Example
//!
//! ```no_run
//! use pingrelay::core::models::MessageEvent;
//! use pingrelay::features::{classify, compose};
//!
//! let message = MessageEvent {
//!     user: "U1".into(),
//!     channel: "C1".into(),
//!     text: "hey @oncall need help".into(),
//!     ts: "100".into(),
//!     ..MessageEvent::default()
//! };
//! let decision = classify(&message, "UBOT", "@oncall");
//! let notification = compose(&message, "acme");
//! println!("{decision:?}: {}", notification.text);
//! ```
pub mod core;
pub mod errors;
pub mod features;
pub mod slack;

pub use errors::RelayError;

/// Configure structured JSON logging on standard output.
///
/// `debug` lowers the level to DEBUG, which also surfaces raw Socket Mode
/// frames and the reason every skipped message was skipped. Calling this more
/// than once is harmless; only the first call installs a subscriber.
///
/// # Example
///
/// ```
/// pingrelay::setup_logging(false);
/// ```
pub fn setup_logging(debug: bool) {
    use tracing_subscriber::filter::LevelFilter;
    use tracing_subscriber::prelude::*;

    let level = if debug {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let fmt_layer = tracing_subscriber::fmt::layer()
        .json()
        .with_target(true)
        .with_writer(std::io::stdout);

    let _ = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(level)
        .try_init();
}
