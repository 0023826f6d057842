//! Types for the job poller.

use serde::Serialize;

use crate::blob::BlobError;
use crate::editor::EditorError;
use crate::gallery::GalleryStoreError;
use crate::job::JobStoreError;

/// Fixed failure message for jobs whose remote edit failed.
pub const EDIT_FAILED_MESSAGE: &str = "Editing failed on the remote service";

/// Fixed failure message for jobs whose remote export failed.
pub const EXPORT_FAILED_MESSAGE: &str = "Export failed on the remote service";

/// Configuration for the job poller.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Page cap for the active-job scan.
    pub scan_max_pages: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self { scan_max_pages: 8 }
    }
}

/// Summary of one poll run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PollReport {
    /// In-flight jobs the scan found.
    pub scanned: usize,
    /// Jobs that advanced a stage this run.
    pub advanced: usize,
    /// Jobs that reached `complete` this run.
    pub completed: usize,
    /// Jobs that were marked `failed` this run.
    pub failed: usize,
}

/// Error type for per-job poll handling.
#[derive(Debug, thiserror::Error)]
pub enum PollerError {
    /// An in-flight job is missing its remote project id.
    #[error("Job {0} has no remote project id")]
    MissingProjectId(String),

    /// A completed export reported zero output files.
    #[error("Export completed with no output files")]
    EmptyExport,

    /// Remote editing service failure.
    #[error(transparent)]
    Editor(#[from] EditorError),

    /// Object storage failure.
    #[error(transparent)]
    Blob(#[from] BlobError),

    /// Job record failure.
    #[error(transparent)]
    JobStore(#[from] JobStoreError),

    /// Gallery record failure.
    #[error(transparent)]
    Gallery(#[from] GalleryStoreError),
}
