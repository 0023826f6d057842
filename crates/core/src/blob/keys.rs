//! Object key layout.

use crate::job::JobSource;

/// Prefix for uploaded-but-not-yet-processed originals.
pub const STAGING_PREFIX: &str = "staging/";

/// Prefix for output awaiting admin review before gallery assignment.
pub const REVIEW_PREFIX: &str = "review/";

/// Finished-output prefix for a gallery.
pub fn finished_prefix(gallery_id: &str) -> String {
    format!("galleries/{}/finished/", gallery_id)
}

/// Staging key for a freshly uploaded original.
pub fn staged_key(filename: &str) -> String {
    format!("{}{}", STAGING_PREFIX, filename)
}

/// The final path segment of a key; upload links are requested by
/// basename, not by full storage key.
pub fn basename(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Storage key for one materialized output file.
///
/// Imagen output goes to the review queue; everything else goes straight
/// into the gallery's finished prefix. A legacy job without a destination
/// gallery also lands in the review queue.
pub fn output_key(source: JobSource, gallery_id: Option<&str>, filename: &str) -> String {
    match (source, gallery_id) {
        (JobSource::Imagen, _) | (JobSource::Legacy, None) => {
            format!("{}{}", REVIEW_PREFIX, filename)
        }
        (JobSource::Legacy, Some(gallery_id)) => {
            format!("{}{}", finished_prefix(gallery_id), filename)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basename() {
        assert_eq!(basename("staging/shoots/IMG_0001.CR2"), "IMG_0001.CR2");
        assert_eq!(basename("IMG_0001.CR2"), "IMG_0001.CR2");
    }

    #[test]
    fn test_imagen_output_goes_to_review() {
        let key = output_key(JobSource::Imagen, Some("g-1"), "edit-1.jpg");
        assert_eq!(key, "review/edit-1.jpg");
    }

    #[test]
    fn test_legacy_output_goes_to_gallery() {
        let key = output_key(JobSource::Legacy, Some("g-1"), "edit-1.jpg");
        assert_eq!(key, "galleries/g-1/finished/edit-1.jpg");
    }

    #[test]
    fn test_legacy_without_gallery_falls_back_to_review() {
        let key = output_key(JobSource::Legacy, None, "edit-1.jpg");
        assert_eq!(key, "review/edit-1.jpg");
    }

    #[test]
    fn test_staged_key() {
        assert_eq!(staged_key("IMG_0001.CR2"), "staging/IMG_0001.CR2");
    }
}
