//! Key-value store backed by one pretty-printed `{dir}/{key}.json` per key.
//!
//! A record that cannot be parsed is reported as absent and logged; the
//! next `set` replaces it.
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use serde_json::Value;
use tokio::fs;
use tracing::{debug, warn};

use super::{KeyValueStore, StorageError};

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn io_error(key: &str, source: std::io::Error) -> StorageError {
    StorageError::Io { key: key.to_owned(), source }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let path = self.path_for(key);
        let bytes = match fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(key, e)),
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "json_store: unreadable record, treating as absent");
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(key, e))?;

        let path = self.path_for(key);
        let content = serde_json::to_vec_pretty(&value).map_err(|source| StorageError::Encode {
            key: key.to_owned(),
            source,
        })?;

        fs::write(&path, &content).await.map_err(|e| io_error(key, e))?;
        debug!(path = %path.display(), bytes = content.len(), "json_store: saved");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error(key, e)),
        }
    }
}
