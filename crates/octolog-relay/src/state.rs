//! Application state shared across all request handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::mappings::MappingCache;
use crate::sink::NotificationSink;
use crate::store::DocumentStore;

/// Shared application state available to all request handlers.
///
/// The store and sink are trait objects so the pipeline stays ignorant of
/// the concrete backends; tests inject in-memory doubles.
#[derive(Clone)]
pub struct AppState {
    /// Relay configuration.
    pub config: Arc<Config>,

    /// Transactional document store (dedupe records + mapping tables).
    pub store: Arc<dyn DocumentStore>,

    /// Chat delivery target.
    pub sink: Arc<dyn NotificationSink>,

    /// Process-wide load-once enrichment tables.
    pub mappings: MappingCache,
}

impl AppState {
    /// Create a new application state from configuration and collaborators.
    pub fn new(
        config: Config,
        store: Arc<dyn DocumentStore>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            sink,
            mappings: MappingCache::new(),
        }
    }
}
