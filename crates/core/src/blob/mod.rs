//! Object storage.
//!
//! Staged originals live under the staging prefix and are deleted after a
//! successful materialization; finished output lands under either the
//! review-queue prefix or a per-gallery finished prefix depending on the
//! job's source discriminator.

mod fs;
mod keys;
mod traits;

pub use fs::FsBlobStore;
pub use keys::{basename, finished_prefix, output_key, staged_key, REVIEW_PREFIX, STAGING_PREFIX};
pub use traits::{BlobError, BlobStore};
