//! Gallery records.
//!
//! The gallery's image list is the only collaborator record the pipeline
//! mutates: finished legacy output is appended to it at materialization
//! time. Appends go through the store's atomic list-append so concurrent
//! admin edits are not lost.

mod store;
mod types;

pub use store::{GalleryStore, GalleryStoreError, GALLERIES_TABLE};
pub use types::{Gallery, GalleryImage};
