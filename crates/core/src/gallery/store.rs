//! Gallery record storage facade.

use std::sync::Arc;

use serde_json::Value;

use crate::store::{Document, DocumentStore, Patch, StoreError};

use super::types::{Gallery, GalleryImage};

/// Logical table holding gallery records.
pub const GALLERIES_TABLE: &str = "galleries";

/// Error type for gallery record operations.
#[derive(Debug, thiserror::Error)]
pub enum GalleryStoreError {
    /// Gallery not found.
    #[error("Gallery not found: {0}")]
    NotFound(String),

    /// Gallery record could not be decoded.
    #[error("Malformed gallery record: {0}")]
    Malformed(String),

    /// Underlying store error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Typed facade over the document store for gallery records.
///
/// Records are keyed by bare gallery id.
#[derive(Clone)]
pub struct GalleryStore {
    store: Arc<dyn DocumentStore>,
}

impl GalleryStore {
    /// Create a gallery store over the given document store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn to_document(gallery: &Gallery) -> Result<Document, GalleryStoreError> {
        match serde_json::to_value(gallery) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(GalleryStoreError::Malformed(format!(
                "gallery serialized to non-object: {}",
                other
            ))),
            Err(e) => Err(GalleryStoreError::Malformed(e.to_string())),
        }
    }

    fn from_document(doc: Document) -> Result<Gallery, GalleryStoreError> {
        serde_json::from_value(Value::Object(doc))
            .map_err(|e| GalleryStoreError::Malformed(e.to_string()))
    }

    /// Fetch a gallery record.
    pub fn get(&self, gallery_id: &str) -> Result<Option<Gallery>, GalleryStoreError> {
        self.store
            .get(GALLERIES_TABLE, gallery_id)?
            .map(Self::from_document)
            .transpose()
    }

    /// Store a gallery record, replacing any existing one.
    pub fn put(&self, gallery: &Gallery) -> Result<(), GalleryStoreError> {
        let doc = Self::to_document(gallery)?;
        self.store.put(GALLERIES_TABLE, &gallery.gallery_id, doc)?;
        Ok(())
    }

    /// Append entries to the gallery's image list.
    ///
    /// Uses the store's atomic list-append, so prior entries and concurrent
    /// writers are preserved; the gallery must exist.
    pub fn append_images(
        &self,
        gallery_id: &str,
        entries: &[GalleryImage],
    ) -> Result<(), GalleryStoreError> {
        if entries.is_empty() {
            return Ok(());
        }
        if self.store.get(GALLERIES_TABLE, gallery_id)?.is_none() {
            return Err(GalleryStoreError::NotFound(gallery_id.to_string()));
        }

        let values = entries
            .iter()
            .map(|entry| {
                serde_json::to_value(entry)
                    .map_err(|e| GalleryStoreError::Malformed(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        self.store
            .update(GALLERIES_TABLE, gallery_id, Patch::new().append("images", values))?;
        Ok(())
    }
}
