//! Durable key-value records holding JSON values.

pub mod file;

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

pub use file::JsonFileStore;

pub const PREFERENCES_KEY: &str = "comfortcheck_preferences";
pub const CURRENT_USER_KEY: &str = "comfortcheck_user";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O error for key {key:?}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode value for key {key:?}: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Absent keys and unreadable records both yield `None`.
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;
    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local store. Clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.inner.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.inner.write().await.insert(key.to_owned(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.write().await.remove(key);
        Ok(())
    }
}
