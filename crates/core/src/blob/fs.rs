//! Filesystem-backed object storage.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::traits::{BlobError, BlobStore};

/// Object storage rooted at a local directory; keys map to relative paths.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    /// Create a store rooted at `root`. The directory is created lazily on
    /// first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a key to a path under the root, rejecting absolute keys and
    /// parent-directory traversal.
    fn resolve(&self, key: &str) -> Result<PathBuf, BlobError> {
        let relative = Path::new(key);
        let traversal = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || traversal {
            return Err(BlobError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    fn name(&self) -> &str {
        "fs"
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        let path = self.resolve(key)?;
        tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                BlobError::NotFound(key.to_string())
            } else {
                BlobError::Io {
                    key: key.to_string(),
                    message: e.to_string(),
                }
            }
        })
    }

    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobError> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BlobError::Io {
                    key: key.to_string(),
                    message: e.to_string(),
                })?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| BlobError::Io {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    async fn delete_many(&self, keys: &[String]) -> Vec<String> {
        let mut failed = Vec::new();
        for key in keys {
            let path = match self.resolve(key) {
                Ok(path) => path,
                Err(_) => {
                    failed.push(key.clone());
                    continue;
                }
            };
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                // already gone counts as deleted
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    debug!(key = %key, "Staged file already absent");
                }
                Err(_) => failed.push(key.clone()),
            }
        }
        failed
    }
}
