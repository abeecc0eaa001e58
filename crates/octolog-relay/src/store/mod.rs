//! Document store collaborator.
//!
//! The relay persists two kinds of documents: the mapping tables that drive
//! message enrichment and one deployment record per processed event id. Both
//! live behind the [`DocumentStore`] trait so the pipeline never sees a
//! concrete backend.
//!
//! The one concurrency-sensitive operation is [`DocumentStore::insert_if_absent`]:
//! two near-simultaneous deliveries of the same event id must not both
//! observe "absent" and both write. Implementations run the check and the
//! write inside their native transaction primitive so exactly one caller
//! wins.

mod memory;
mod rocks;

pub use self::memory::MemoryStore;
pub use self::rocks::RocksStore;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Collection names used by the relay.
pub mod collections {
    /// Lookup tables: `categoryToEmoji` and `projectToChannel`.
    pub const MAPPINGS: &str = "mappings";

    /// One record per processed event id; presence means "already processed".
    pub const DEPLOYMENTS: &str = "deployments";
}

/// Result type alias using the store error type.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors raised by a document store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Storage backend failure (I/O, lock conflict, corruption).
    #[error("storage backend error: {0}")]
    Backend(#[from] rocksdb::Error),

    /// A document could not be serialized or deserialized.
    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Transactional key-value persistence for JSON documents.
///
/// Documents are addressed by `(collection, key)`. Collections are flat
/// namespaces; there is no listing or deletion because the relay never needs
/// either.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document, or `None` if it does not exist.
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>>;

    /// Write a document only if no document exists under the key.
    ///
    /// Returns `true` iff this caller created the record. The existence
    /// check and the write happen atomically: under concurrent calls for
    /// the same key, exactly one caller sees `true`.
    async fn insert_if_absent(&self, collection: &str, key: &str, value: &Value) -> Result<bool>;
}

/// Encode a `(collection, key)` pair into a single storage key.
fn doc_key(collection: &str, key: &str) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(collection.len() + key.len() + 1);
    encoded.extend_from_slice(collection.as_bytes());
    encoded.push(b'/');
    encoded.extend_from_slice(key.as_bytes());
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_key_joins_collection_and_key() {
        assert_eq!(doc_key("deployments", "Events-1"), b"deployments/Events-1");
    }

    #[test]
    fn doc_key_distinguishes_collections() {
        assert_ne!(doc_key("mappings", "x"), doc_key("deployments", "x"));
    }
}
