//! Trait definitions for object storage backends.

use async_trait::async_trait;

/// Error type for blob operations.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// No object under the given key.
    #[error("Blob not found: {0}")]
    NotFound(String),

    /// Key is not addressable by this backend.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Underlying I/O error.
    #[error("I/O error for {key}: {message}")]
    Io {
        /// Offending key.
        key: String,
        /// Backend error message.
        message: String,
    },
}

/// An object storage backend.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Returns the name of this storage implementation.
    fn name(&self) -> &str;

    /// Read an object's bytes.
    async fn get(&self, key: &str) -> Result<Vec<u8>, BlobError>;

    /// Store an object, replacing any existing one under the same key.
    async fn put(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobError>;

    /// Best-effort bulk delete. Returns the keys that could not be
    /// deleted; deleting an absent object counts as success.
    async fn delete_many(&self, keys: &[String]) -> Vec<String>;
}
