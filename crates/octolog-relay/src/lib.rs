//! Octolog Relay - webhook relay from Octopus Deploy to Slack
//!
//! This crate receives deployment-event notifications from Octopus Deploy
//! subscriptions on a single HTTP endpoint, deduplicates them against a
//! transactional document store, enriches them via two cached lookup tables,
//! and forwards a formatted message to a Slack-compatible incoming webhook.
//!
//! # Architecture
//!
//! - **Pipeline**: six ordered stages per request (authorize → extract →
//!   dedupe → load mappings → compose → forward), each short-circuiting to
//!   a structured failure
//! - **AppState**: shared configuration plus the store/sink collaborators
//! - **Store**: transactional key-value persistence behind a trait
//!   (RocksDB in production, in-memory in tests)
//! - **Sink**: fire-and-forget chat delivery behind a trait

mod config;
mod error;
pub mod mappings;
pub mod pipeline;
mod routes;
pub mod sink;
mod state;
pub mod store;

pub use self::config::Config;
pub use self::error::RelayError;
pub use self::routes::router;
pub use self::sink::{NotificationSink, SlackWebhook};
pub use self::state::AppState;
pub use self::store::{DocumentStore, RocksStore};

#[cfg(test)]
pub(crate) mod testutil;
