//! In-memory document store for tests and local development.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use super::{doc_key, DocumentStore, Result};

/// Mutex-guarded map store. The whole map is the transaction scope, which
/// trivially gives the at-most-one-winner guarantee.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<Vec<u8>, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents, across all collections.
    pub fn len(&self) -> usize {
        self.documents.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.lock().is_empty()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Value>> {
        Ok(self.documents.lock().get(&doc_key(collection, key)).cloned())
    }

    async fn insert_if_absent(&self, collection: &str, key: &str, value: &Value) -> Result<bool> {
        let mut documents = self.documents.lock();
        let storage_key = doc_key(collection, key);
        if documents.contains_key(&storage_key) {
            return Ok(false);
        }
        documents.insert(storage_key, value.clone());
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::collections;
    use serde_json::json;

    #[tokio::test]
    async fn get_returns_inserted_document() {
        let store = MemoryStore::new();
        let doc = json!({"Projects-42": "#releases"});

        assert!(store
            .insert_if_absent(collections::MAPPINGS, "projectToChannel", &doc)
            .await
            .unwrap());
        let fetched = store
            .get(collections::MAPPINGS, "projectToChannel")
            .await
            .unwrap();
        assert_eq!(fetched, Some(doc));
    }

    #[tokio::test]
    async fn second_insert_loses() {
        let store = MemoryStore::new();
        let first = json!({"v": 1});
        let second = json!({"v": 2});

        assert!(store
            .insert_if_absent(collections::DEPLOYMENTS, "Events-1", &first)
            .await
            .unwrap());
        assert!(!store
            .insert_if_absent(collections::DEPLOYMENTS, "Events-1", &second)
            .await
            .unwrap());

        // The losing write must not clobber the record.
        let fetched = store.get(collections::DEPLOYMENTS, "Events-1").await.unwrap();
        assert_eq!(fetched, Some(first));
    }

    #[tokio::test]
    async fn len_counts_all_collections() {
        let store = MemoryStore::new();
        store
            .insert_if_absent(collections::MAPPINGS, "a", &json!(1))
            .await
            .unwrap();
        store
            .insert_if_absent(collections::DEPLOYMENTS, "a", &json!(2))
            .await
            .unwrap();
        assert_eq!(store.len(), 2);
        assert!(!store.is_empty());
    }
}
