//! Gallery data types.

use serde::{Deserialize, Serialize};

/// One entry in a gallery's image list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryImage {
    /// Object-storage key of the image.
    pub key: String,
    /// Alt text; empty for freshly materialized output.
    #[serde(default)]
    pub alt: String,
}

impl GalleryImage {
    /// Create an entry with empty alt text.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            alt: String::new(),
        }
    }
}

/// A gallery record.
///
/// Galleries are owned by the admin CRUD layer; the pipeline only ever
/// appends to `images`. Fields this model does not know about are carried
/// through `extra` so a read-write cycle never drops them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gallery {
    /// Gallery id; also the record key.
    pub gallery_id: String,

    /// Ordered image list.
    #[serde(default)]
    pub images: Vec<GalleryImage>,

    /// Passthrough for fields owned by the admin layer.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Gallery {
    /// Create an empty gallery.
    pub fn new(gallery_id: impl Into<String>) -> Self {
        Self {
            gallery_id: gallery_id.into(),
            images: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_gallery_image_defaults_alt() {
        let parsed: GalleryImage = serde_json::from_value(json!({"key": "a.jpg"})).unwrap();
        assert_eq!(parsed.alt, "");
    }

    #[test]
    fn test_unknown_fields_roundtrip() {
        let raw = json!({
            "gallery_id": "g-1",
            "images": [{"key": "a.jpg", "alt": "dunes"}],
            "title": "Namibia 2025",
            "password_hash": "abc"
        });

        let gallery: Gallery = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(gallery.images.len(), 1);
        assert_eq!(gallery.extra.get("title"), Some(&json!("Namibia 2025")));

        let back = serde_json::to_value(&gallery).unwrap();
        assert_eq!(back, raw);
    }
}
