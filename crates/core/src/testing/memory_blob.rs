//! In-memory object store for testing.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::blob::{BlobError, BlobStore};

/// Mock implementation of the [`BlobStore`] trait backed by a map.
///
/// Deletes can be made to fail per key, for exercising the best-effort
/// cleanup path.
#[derive(Default)]
pub struct MemoryBlobStore {
    objects: RwLock<HashMap<String, Vec<u8>>>,
    fail_deletes: RwLock<HashSet<String>>,
    deleted: RwLock<Vec<String>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object.
    pub async fn insert(&self, key: &str, bytes: &[u8]) {
        self.objects
            .write()
            .await
            .insert(key.to_string(), bytes.to_vec());
    }

    /// Returns the stored bytes for `key`, if present.
    pub async fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.read().await.get(key).cloned()
    }

    /// Returns true if `key` is stored.
    pub async fn contains(&self, key: &str) -> bool {
        self.objects.read().await.contains_key(key)
    }

    /// All stored keys, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.read().await.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Make deletes of `key` fail.
    pub async fn fail_delete_of(&self, key: &str) {
        self.fail_deletes.write().await.insert(key.to_string());
    }

    /// Keys successfully deleted so far, in order.
    pub async fn deleted_keys(&self) -> Vec<String> {
        self.deleted.read().await.clone()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(key.to_string()))
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobError> {
        self.objects.write().await.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn delete_many(&self, keys: &[String]) -> Vec<String> {
        let fail = self.fail_deletes.read().await;
        let mut objects = self.objects.write().await;
        let mut deleted = self.deleted.write().await;

        let mut failed = Vec::new();
        for key in keys {
            if fail.contains(key) {
                failed.push(key.clone());
                continue;
            }
            objects.remove(key);
            deleted.push(key.clone());
        }
        failed
    }
}
