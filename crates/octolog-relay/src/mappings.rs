//! Process-wide enrichment tables.
//!
//! Two small lookup tables live in the document store's `mappings`
//! collection: `categoryToEmoji` (event category → emoji) and
//! `projectToChannel` (project id → chat channel). They are fetched once per
//! process lifetime on first use, concurrently, and cached with no
//! invalidation path; edits to the store documents take effect on the next
//! deploy.
//!
//! A failed load caches nothing, so the next request retries from scratch.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::OnceCell;

use crate::store::{collections, DocumentStore, StoreError};

/// Document key for the category → emoji table.
pub const CATEGORY_TO_EMOJI: &str = "categoryToEmoji";

/// Document key for the project → channel table.
pub const PROJECT_TO_CHANNEL: &str = "projectToChannel";

/// Errors raised while loading the mapping tables.
#[derive(Error, Debug)]
pub enum MappingError {
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A mapping document is missing from the store entirely.
    #[error("mapping document '{collection}/{key}' not found")]
    MissingDocument {
        collection: &'static str,
        key: &'static str,
    },

    /// A mapping document exists but is not a string-to-string table.
    #[error("mapping document '{key}' is malformed: {source}")]
    Malformed {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// The two enrichment tables, immutable once loaded.
#[derive(Debug, Clone, Default)]
pub struct Mappings {
    category_to_emoji: HashMap<String, String>,
    project_to_channel: HashMap<String, String>,
}

impl Mappings {
    /// Build from already-materialized tables. Used by tests.
    pub fn new(
        category_to_emoji: HashMap<String, String>,
        project_to_channel: HashMap<String, String>,
    ) -> Self {
        Self {
            category_to_emoji,
            project_to_channel,
        }
    }

    /// Fetch both mapping documents and materialize the tables.
    ///
    /// The two reads are independent and run concurrently. Either failing
    /// fails the whole load.
    pub async fn load(store: &dyn DocumentStore) -> Result<Self, MappingError> {
        let (emoji_doc, channel_doc) = tokio::try_join!(
            store.get(collections::MAPPINGS, CATEGORY_TO_EMOJI),
            store.get(collections::MAPPINGS, PROJECT_TO_CHANNEL),
        )?;

        Ok(Self {
            category_to_emoji: parse_table(CATEGORY_TO_EMOJI, emoji_doc)?,
            project_to_channel: parse_table(PROJECT_TO_CHANNEL, channel_doc)?,
        })
    }

    /// Emoji for an event category, if one is configured.
    pub fn emoji_for(&self, category: &str) -> Option<&str> {
        self.category_to_emoji.get(category).map(String::as_str)
    }

    /// Chat channel for a project id, if one is configured.
    pub fn channel_for(&self, project_id: &str) -> Option<&str> {
        self.project_to_channel.get(project_id).map(String::as_str)
    }
}

fn parse_table(
    key: &'static str,
    doc: Option<serde_json::Value>,
) -> Result<HashMap<String, String>, MappingError> {
    let doc = doc.ok_or(MappingError::MissingDocument {
        collection: collections::MAPPINGS,
        key,
    })?;

    serde_json::from_value(doc).map_err(|source| MappingError::Malformed { key, source })
}

/// Load-once guard around [`Mappings`].
///
/// Cloning shares the underlying cell, so every request handler sees the
/// same cache. The cell is written at most once per process lifetime; a
/// failed load leaves it empty.
#[derive(Clone, Default)]
pub struct MappingCache {
    cell: Arc<OnceCell<Mappings>>,
}

impl MappingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached tables, loading them on first use.
    ///
    /// Concurrent first-time callers coalesce onto a single load.
    pub async fn get_or_load(&self, store: &dyn DocumentStore) -> Result<&Mappings, MappingError> {
        self.cell
            .get_or_try_init(|| async {
                metrics::counter!("mapping_loads_total").increment(1);
                let loaded = Mappings::load(store).await;
                if loaded.is_err() {
                    metrics::counter!("mapping_load_failures_total").increment(1);
                }
                loaded
            })
            .await
    }
}
