//! RocksDB-backed document store.
//!
//! Uses a pessimistic [`TransactionDB`] so the dedupe check-and-set can lock
//! the key between read and write. Point lookups and single-document writes
//! are cheap enough to run inline on the request path.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rocksdb::{MultiThreaded, Options, TransactionDB, TransactionDBOptions};
use serde_json::Value;
use tracing::info;

use super::{doc_key, DocumentStore, Result};

/// Transactional RocksDB store for JSON documents.
///
/// Thread-safe: share across tasks via `Arc<RocksStore>`.
pub struct RocksStore {
    db: Arc<TransactionDB<MultiThreaded>>,
}

impl RocksStore {
    /// Open or create a store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening document store at {}", path.display());

        let mut opts = Options::default();
        opts.create_if_missing(true);

        // Bloom filters keep the common "event id not seen" lookup fast.
        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        opts.set_block_based_table_factory(&block_opts);

        let txn_opts = TransactionDBOptions::default();
        let db = TransactionDB::open(&opts, &txn_opts, path)?;

        Ok(Self { db: Arc::new(db) })
    }
}

#[async_trait]
impl DocumentStore for RocksStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        match self.db.get(doc_key(collection, key))? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn insert_if_absent(&self, collection: &str, key: &str, value: &Value) -> Result<bool> {
        let storage_key = doc_key(collection, key);
        let bytes = serde_json::to_vec(value)?;

        let txn = self.db.transaction();

        // Exclusive read locks the key until commit, so a concurrent insert
        // for the same key waits here and then observes our write.
        if txn.get_for_update(&storage_key, true)?.is_some() {
            return Ok(false);
        }

        txn.put(&storage_key, &bytes)?;
        txn.commit()?;

        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::collections;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn open_and_get_absent() {
        let tmp = TempDir::new().unwrap();
        let store = RocksStore::open(tmp.path()).unwrap();

        let doc = store.get(collections::DEPLOYMENTS, "Events-1").await.unwrap();
        assert!(doc.is_none());
    }

    #[tokio::test]
    async fn insert_if_absent_wins_once() {
        let tmp = TempDir::new().unwrap();
        let store = RocksStore::open(tmp.path()).unwrap();
        let doc = json!({"Event": {"Id": "Events-1"}});

        assert!(store
            .insert_if_absent(collections::DEPLOYMENTS, "Events-1", &doc)
            .await
            .unwrap());
        assert!(!store
            .insert_if_absent(collections::DEPLOYMENTS, "Events-1", &doc)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn stored_document_round_trips() {
        let tmp = TempDir::new().unwrap();
        let store = RocksStore::open(tmp.path()).unwrap();
        let doc = json!({"Deploy": "🚀", "DeploymentFailed": "💥"});

        store
            .insert_if_absent(collections::MAPPINGS, "categoryToEmoji", &doc)
            .await
            .unwrap();

        let fetched = store
            .get(collections::MAPPINGS, "categoryToEmoji")
            .await
            .unwrap();
        assert_eq!(fetched, Some(doc));
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let tmp = TempDir::new().unwrap();
        let store = RocksStore::open(tmp.path()).unwrap();
        let doc = json!({"a": 1});

        store
            .insert_if_absent(collections::MAPPINGS, "shared-key", &doc)
            .await
            .unwrap();

        let other = store.get(collections::DEPLOYMENTS, "shared-key").await.unwrap();
        assert!(other.is_none());
    }

    #[tokio::test]
    async fn concurrent_inserts_have_one_winner() {
        let tmp = TempDir::new().unwrap();
        let store = Arc::new(RocksStore::open(tmp.path()).unwrap());
        let doc = json!({"n": 1});

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = Arc::clone(&store);
            let doc = doc.clone();
            handles.push(tokio::spawn(async move {
                store
                    .insert_if_absent(collections::DEPLOYMENTS, "Events-contended", &doc)
                    .await
                    .unwrap()
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }
        assert_eq!(winners, 1);
    }
}
