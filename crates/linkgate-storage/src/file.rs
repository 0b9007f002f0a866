//! JSON-file storage backend.
//!
//! Persists the entire key space as a single JSON document: a map from key to
//! base64-encoded value. The whole document is rewritten after every mutation
//! through a temp-file-and-rename so a crash mid-write never leaves a torn
//! file behind.
//!
//! This backend is sized for LinkGate's data set — one settings record, a
//! short issued-links list, and a handful of admin sessions. It is not a
//! general-purpose database.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{StorageBackend, StorageError};

/// A storage backend persisting to a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
    data: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl JsonFileBackend {
    /// Open (or create) the backend at the given path.
    ///
    /// A missing file starts an empty key space; parent directories are
    /// created as needed.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Open`] if the file or its directory cannot be
    ///   created or read.
    /// - [`StorageError::Corrupt`] if an existing file is not a valid
    ///   key-to-base64 JSON map.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| StorageError::Open {
                    path: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            }
        }

        let data = if path.exists() {
            let raw = std::fs::read(&path).map_err(|e| StorageError::Open {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
            decode_document(&raw, &path)?
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), keys = data.len(), "opened JSON file storage");

        Ok(Self {
            path,
            data: Arc::new(RwLock::new(data)),
        })
    }

    /// Serialize the current map and atomically replace the on-disk file.
    async fn persist(&self, data: &BTreeMap<String, Vec<u8>>) -> Result<(), StorageError> {
        let encoded: BTreeMap<&str, String> = data
            .iter()
            .map(|(k, v)| (k.as_str(), BASE64.encode(v)))
            .collect();

        let json = serde_json::to_vec_pretty(&encoded).map_err(|e| StorageError::Write {
            key: String::new(),
            reason: format!("document serialization failed: {e}"),
        })?;

        let tmp = self.path.with_extension("tmp");
        tokio::fs::write(&tmp, &json)
            .await
            .map_err(|e| StorageError::Write {
                key: String::new(),
                reason: format!("temp file write failed: {e}"),
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StorageError::Write {
                key: String::new(),
                reason: format!("rename into place failed: {e}"),
            })
    }
}

/// Parse an on-disk document into the in-memory map.
fn decode_document(
    raw: &[u8],
    path: &Path,
) -> Result<BTreeMap<String, Vec<u8>>, StorageError> {
    let encoded: BTreeMap<String, String> =
        serde_json::from_slice(raw).map_err(|e| StorageError::Corrupt {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    encoded
        .into_iter()
        .map(|(k, v)| {
            let bytes = BASE64.decode(&v).map_err(|e| StorageError::Corrupt {
                path: path.display().to_string(),
                reason: format!("invalid base64 value for key '{k}': {e}"),
            })?;
            Ok((k, bytes))
        })
        .collect()
}

#[async_trait::async_trait]
impl StorageBackend for JsonFileBackend {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let data = self.data.read().await;
        Ok(data.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let mut data = self.data.write().await;
        data.insert(key.to_owned(), value.to_vec());
        self.persist(&data).await
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let mut data = self.data.write().await;
        if data.remove(key).is_some() {
            self.persist(&data).await?;
        }
        Ok(())
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let data = self.data.read().await;
        let keys = data
            .range(prefix.to_owned()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect();
        Ok(keys)
    }

    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        let data = self.data.read().await;
        Ok(data.contains_key(key))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn roundtrip_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let backend = JsonFileBackend::open(&path).unwrap();
        backend.put("sys/settings", b"hello").await.unwrap();
        backend.put("sys/links/a", b"\x00\xff").await.unwrap();
        drop(backend);

        let reopened = JsonFileBackend::open(&path).unwrap();
        assert_eq!(
            reopened.get("sys/settings").await.unwrap(),
            Some(b"hello".to_vec())
        );
        assert_eq!(
            reopened.get("sys/links/a").await.unwrap(),
            Some(vec![0x00, 0xff])
        );
    }

    #[tokio::test]
    async fn delete_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");

        let backend = JsonFileBackend::open(&path).unwrap();
        backend.put("key", b"v").await.unwrap();
        backend.delete("key").await.unwrap();
        drop(backend);

        let reopened = JsonFileBackend::open(&path).unwrap();
        assert_eq!(reopened.get("key").await.unwrap(), None);
    }

    #[tokio::test]
    async fn corrupt_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        std::fs::write(&path, b"not json at all").unwrap();

        let result = JsonFileBackend::open(&path);
        assert!(matches!(result, Err(StorageError::Corrupt { .. })));
    }

    #[tokio::test]
    async fn missing_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let backend = JsonFileBackend::open(dir.path().join("fresh.json")).unwrap();
        assert_eq!(backend.list("").await.unwrap(), Vec::<String>::new());
    }
}
