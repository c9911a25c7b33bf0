use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Backend, Record, StoreError};

#[derive(Default)]
pub struct MemoryBackend {
    collections: RwLock<HashMap<String, HashMap<String, Record>>>,
    indexes: RwLock<HashMap<String, HashMap<String, String>>>,
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn get(&self, collection: &str, key: &str) -> Result<Option<Record>, StoreError> {
        let collections = self.collections.read().await;

        Ok(collections
            .get(collection)
            .and_then(|documents| documents.get(key))
            .cloned())
    }

    async fn values(&self, collection: &str) -> Result<Vec<String>, StoreError> {
        let collections = self.collections.read().await;

        Ok(collections
            .get(collection)
            .map(|documents| documents.values().map(|record| record.body.clone()).collect())
            .unwrap_or_default())
    }

    async fn put(
        &self,
        collection: &str,
        key: &str,
        expected: u64,
        body: String,
    ) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;
        let documents = collections.entry(collection.to_string()).or_default();

        let current = documents.get(key).map_or(0, |record| record.version);
        if current != expected {
            return Ok(false);
        }

        documents.insert(
            key.to_string(),
            Record {
                version: current + 1,
                body,
            },
        );

        Ok(true)
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().await;

        Ok(collections
            .get_mut(collection)
            .and_then(|documents| documents.remove(key))
            .is_some())
    }

    async fn claim(&self, index: &str, key: &str, value: &str) -> Result<bool, StoreError> {
        let mut indexes = self.indexes.write().await;
        let entries = indexes.entry(index.to_string()).or_default();

        if entries.contains_key(key) {
            return Ok(false);
        }

        entries.insert(key.to_string(), value.to_string());
        Ok(true)
    }

    async fn lookup(&self, index: &str, key: &str) -> Result<Option<String>, StoreError> {
        let indexes = self.indexes.read().await;

        Ok(indexes.get(index).and_then(|entries| entries.get(key)).cloned())
    }

    async fn release(&self, index: &str, key: &str) -> Result<(), StoreError> {
        let mut indexes = self.indexes.write().await;

        if let Some(entries) = indexes.get_mut(index) {
            entries.remove(key);
        }

        Ok(())
    }

    async fn release_value(&self, index: &str, value: &str) -> Result<u64, StoreError> {
        let mut indexes = self.indexes.write().await;

        let Some(entries) = indexes.get_mut(index) else {
            return Ok(0);
        };

        let before = entries.len();
        entries.retain(|_, owner| owner.as_str() != value);

        Ok((before - entries.len()) as u64)
    }
}
