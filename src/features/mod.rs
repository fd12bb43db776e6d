pub mod notify;
pub mod relay;

pub use notify::{Notifier, classify, compose, forward};
pub use relay::run_relay;
