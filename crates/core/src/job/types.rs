//! Core processing-job data types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current status of a processing job.
///
/// State machine flow:
/// ```text
/// queued -> uploading -> processing -> exporting -> downloading -> complete
///               |             |            |             |
///               +-------------+------------+-------------+--> failed
/// ```
///
/// `queued` and `uploading` belong to an in-flight orchestrator invocation;
/// `processing` and `exporting` are advanced by the poller; `downloading`
/// is a transient sub-state set at the start of materialization and always
/// resolved to `complete` or `failed` within the same poll run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Uploading,
    Processing,
    Exporting,
    Downloading,
    Complete,
    Failed,
}

impl JobStatus {
    /// Returns the status as its stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Uploading => "uploading",
            JobStatus::Processing => "processing",
            JobStatus::Exporting => "exporting",
            JobStatus::Downloading => "downloading",
            JobStatus::Complete => "complete",
            JobStatus::Failed => "failed",
        }
    }

    /// Parse the stored string form.
    pub fn parse(s: &str) -> Option<JobStatus> {
        match s {
            "queued" => Some(JobStatus::Queued),
            "uploading" => Some(JobStatus::Uploading),
            "processing" => Some(JobStatus::Processing),
            "exporting" => Some(JobStatus::Exporting),
            "downloading" => Some(JobStatus::Downloading),
            "complete" => Some(JobStatus::Complete),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Complete | JobStatus::Failed)
    }

    /// Returns true if the poller owns jobs in this status.
    pub fn is_pollable(&self) -> bool {
        matches!(self, JobStatus::Processing | JobStatus::Exporting)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a job's output goes after export.
///
/// `Imagen` output lands in the admin review queue awaiting approval;
/// `Legacy` output is appended directly to the destination gallery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobSource {
    Imagen,
    Legacy,
}

impl JobSource {
    /// Returns the source as its stored string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobSource::Imagen => "imagen",
            JobSource::Legacy => "legacy",
        }
    }

    /// Parse the stored string form; anything that is not `imagen` takes
    /// the legacy materialization path.
    pub fn parse(s: &str) -> JobSource {
        if s == "imagen" {
            JobSource::Imagen
        } else {
            JobSource::Legacy
        }
    }
}

impl fmt::Display for JobSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A processing job: one batch of staged source photos.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingJob {
    /// Unique identifier, assigned at creation, immutable.
    pub job_id: String,

    /// Destination gallery; absent for jobs whose output goes to the
    /// review queue rather than directly into a gallery.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gallery_id: Option<String>,

    /// Object-storage keys of the staged source files, in order. Immutable
    /// after creation; defines what gets uploaded and what gets deleted on
    /// success.
    pub raw_keys: Vec<String>,

    /// Current status.
    pub status: JobStatus,

    /// Output routing discriminator, persisted at orchestration time so the
    /// poller can pick the materialization path without re-deriving it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<JobSource>,

    /// Project id on the remote editing service; absent until the
    /// orchestrator creates one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_project_id: Option<String>,

    /// Stored output keys; populated only on success.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub result_keys: Vec<String>,

    /// Last failure message; present only when the job failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// When the job record was created.
    pub created_at: DateTime<Utc>,

    /// Refreshed on every state transition.
    pub updated_at: DateTime<Utc>,

    /// When the job reached `complete`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProcessingJob {
    /// Create a fresh job record in `queued` status.
    pub fn new(
        job_id: impl Into<String>,
        gallery_id: Option<String>,
        raw_keys: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            job_id: job_id.into(),
            gallery_id,
            raw_keys,
            status: JobStatus::Queued,
            source: None,
            remote_project_id: None,
            result_keys: Vec::new(),
            error: None,
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    /// The source used for materialization routing; unset means legacy.
    pub fn effective_source(&self) -> JobSource {
        self.source.unwrap_or(JobSource::Legacy)
    }
}
