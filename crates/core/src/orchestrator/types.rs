//! Types for the job orchestrator.

use serde::{Deserialize, Serialize};

use crate::blob::BlobError;
use crate::editor::EditorError;
use crate::job::{JobSource, JobStoreError};

/// Trigger payload: one newly created job to start processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessRequest {
    /// Id of the job record created by the trigger.
    pub job_id: String,

    /// Destination gallery, if the output goes directly into one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery_id: Option<String>,

    /// Staged source file keys; must be non-empty.
    pub raw_keys: Vec<String>,

    /// Output routing discriminator, persisted onto the job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<JobSource>,

    /// Explicit editing profile override; skips extension-based inference.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
}

/// Error type for orchestration.
#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// Missing credential or profile; never retried.
    #[error("Editing service not configured: {0}")]
    Configuration(String),

    /// The request named no staged files.
    #[error("No staged files to process")]
    EmptyBatch,

    /// The service issued no usable upload link for a file.
    #[error("No upload link for file: {0}")]
    MissingUploadLink(String),

    /// Remote editing service failure.
    #[error(transparent)]
    Editor(#[from] EditorError),

    /// Object storage failure.
    #[error(transparent)]
    Blob(#[from] BlobError),

    /// Job record failure.
    #[error(transparent)]
    JobStore(#[from] JobStoreError),
}
