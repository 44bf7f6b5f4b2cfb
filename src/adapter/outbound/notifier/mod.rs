//! Notification adapters.

mod log;

pub use log::LogNotifier;
