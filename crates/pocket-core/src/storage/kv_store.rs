use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use thiserror::Error;

/// Errors produced by key-value store implementations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KvStoreError {
    /// Requested key has never been written (or was deleted).
    #[error("entry not found for key: {key}")]
    NotFound { key: String },
    /// Underlying storage failure.
    #[error("storage failure: {reason}")]
    Storage { reason: String },
}

/// Minimal durable key-value contract. Values are opaque bytes; each `put`
/// replaces the whole entry so readers never observe a partial write.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Persist a value under a key, overwriting any existing entry.
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), KvStoreError>;

    /// Retrieve the value for a key.
    async fn get(&self, key: &str) -> Result<Vec<u8>, KvStoreError>;

    /// Remove a key and its value (idempotent).
    async fn delete(&self, key: &str) -> Result<(), KvStoreError>;
}

/// Process-local store for tests and ephemeral sessions. Clones share the same
/// map, which lets tests simulate a restart by handing a clone to a new owner.
#[derive(Debug, Default, Clone)]
pub struct InMemoryKvStore {
    inner: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for InMemoryKvStore {
    async fn put(&self, key: &str, value: &[u8]) -> Result<(), KvStoreError> {
        let mut map = self.inner.lock().map_err(|err| KvStoreError::Storage {
            reason: format!("lock poisoned: {err}"),
        })?;
        map.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, KvStoreError> {
        let map = self.inner.lock().map_err(|err| KvStoreError::Storage {
            reason: format!("lock poisoned: {err}"),
        })?;
        map.get(key).cloned().ok_or_else(|| KvStoreError::NotFound {
            key: key.to_string(),
        })
    }

    async fn delete(&self, key: &str) -> Result<(), KvStoreError> {
        let mut map = self.inner.lock().map_err(|err| KvStoreError::Storage {
            reason: format!("lock poisoned: {err}"),
        })?;
        map.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_returns_value() {
        let store = InMemoryKvStore::new();
        store.put("todos", b"[]").await.expect("put should succeed");
        let value = store.get("todos").await.expect("get should succeed");
        assert_eq!(value, b"[]");
    }

    #[tokio::test]
    async fn clones_share_entries() {
        let store = InMemoryKvStore::new();
        let other = store.clone();
        store.put("k", b"v").await.expect("put");
        assert_eq!(other.get("k").await.expect("get"), b"v");
    }

    #[tokio::test]
    async fn delete_is_idempotent_and_removes_data() {
        let store = InMemoryKvStore::new();
        store.put("k", b"v").await.expect("put should succeed");
        store.delete("k").await.expect("delete should succeed");
        store
            .delete("k")
            .await
            .expect("delete again should still succeed");

        let err = store
            .get("k")
            .await
            .expect_err("get should fail after delete");
        assert!(matches!(err, KvStoreError::NotFound { .. }));
    }
}
