//! Job orchestrator implementation.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::blob::{basename, BlobStore};
use crate::editor::{PhotoEditor, UploadTarget};
use crate::job::{JobPatch, JobStatus, JobStore};
use crate::metrics;

use super::config::OrchestratorConfig;
use super::types::{OrchestratorError, ProcessRequest};

/// Drives a newly created job from `queued` through "editing has begun" on
/// the remote service, then returns. Side effects are strictly sequential;
/// each step's failure aborts all later steps and is recorded on the job.
pub struct JobOrchestrator {
    config: OrchestratorConfig,
    jobs: JobStore,
    editor: Arc<dyn PhotoEditor>,
    blobs: Arc<dyn BlobStore>,
}

impl JobOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        config: OrchestratorConfig,
        jobs: JobStore,
        editor: Arc<dyn PhotoEditor>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            config,
            jobs,
            editor,
            blobs,
        }
    }

    /// Run one orchestration to completion.
    ///
    /// The outcome is recorded on the job record either way; the returned
    /// error mirrors what was recorded, for callers that log it.
    pub async fn run(&self, request: ProcessRequest) -> Result<(), OrchestratorError> {
        info!(
            job_id = %request.job_id,
            files = request.raw_keys.len(),
            "Starting orchestration"
        );

        // Configuration problems fail the job before any remote call.
        let profile = match self.resolve_profile(&request) {
            Ok(profile) => profile,
            Err(e) => {
                self.record_failure(&request.job_id, &e);
                return Err(e);
            }
        };

        let mut patch = JobPatch::new().with_status(JobStatus::Uploading);
        if let Some(source) = request.source {
            patch = patch.with_source(source);
        }
        self.jobs.update_status(&request.job_id, patch)?;
        metrics::JOB_TRANSITIONS
            .with_label_values(&[JobStatus::Uploading.as_str()])
            .inc();

        match self.start_remote(&request, &profile).await {
            Ok(project_id) => {
                self.jobs.update_status(
                    &request.job_id,
                    JobPatch::new()
                        .with_status(JobStatus::Processing)
                        .with_remote_project_id(project_id.clone()),
                )?;
                metrics::JOB_TRANSITIONS
                    .with_label_values(&[JobStatus::Processing.as_str()])
                    .inc();
                info!(
                    job_id = %request.job_id,
                    project_id = %project_id,
                    "Editing started on remote service"
                );
                Ok(())
            }
            Err(e) => {
                self.record_failure(&request.job_id, &e);
                Err(e)
            }
        }
    }

    fn resolve_profile(&self, request: &ProcessRequest) -> Result<String, OrchestratorError> {
        if request.raw_keys.is_empty() {
            return Err(OrchestratorError::EmptyBatch);
        }
        self.config
            .resolve_profile(&request.raw_keys, request.profile_id.as_deref())
    }

    /// Steps 3-6: create the project, upload every staged file, begin the
    /// edit. Returns the remote project id.
    async fn start_remote(
        &self,
        request: &ProcessRequest,
        profile: &str,
    ) -> Result<String, OrchestratorError> {
        let project_id = self.editor.create_project().await?;

        // Upload links are requested by basename in a single batched call.
        let filenames: Vec<String> = request
            .raw_keys
            .iter()
            .map(|key| basename(key).to_string())
            .collect();
        let targets = self.editor.upload_links(&project_id, &filenames).await?;

        let by_name: HashMap<&str, &UploadTarget> =
            targets.iter().map(|t| (t.filename.as_str(), t)).collect();

        // A missing or empty link for any file fails the whole job.
        let mut uploads: Vec<(&str, &UploadTarget)> = Vec::with_capacity(request.raw_keys.len());
        for key in &request.raw_keys {
            let name = basename(key);
            let target = by_name
                .get(name)
                .copied()
                .filter(|t| !t.url.is_empty())
                .ok_or_else(|| OrchestratorError::MissingUploadLink(name.to_string()))?;
            uploads.push((key.as_str(), target));
        }

        // Sequential groups bound memory and outbound concurrency when RAW
        // files are large; uploads within a group run in parallel.
        for group in uploads.chunks(self.config.upload_batch_size.max(1)) {
            let batch = group
                .iter()
                .map(|(key, target)| self.upload_one(key, target));
            for result in futures::future::join_all(batch).await {
                result?;
            }
        }

        // The profile rides on the edit call, not on project creation.
        self.editor.begin_edit(&project_id, profile).await?;

        Ok(project_id)
    }

    async fn upload_one(&self, key: &str, target: &UploadTarget) -> Result<(), OrchestratorError> {
        let bytes = self.blobs.get(key).await?;
        debug!(key = %key, size = bytes.len(), "Uploading staged file");
        self.editor.upload(target, bytes).await?;
        metrics::FILES_UPLOADED.inc();
        Ok(())
    }

    /// Terminal handler: record the failure on the job record.
    fn record_failure(&self, job_id: &str, error: &OrchestratorError) {
        warn!(job_id = %job_id, error = %error, "Orchestration failed");
        metrics::JOB_TRANSITIONS
            .with_label_values(&[JobStatus::Failed.as_str()])
            .inc();
        let patch = JobPatch::new()
            .with_status(JobStatus::Failed)
            .with_error(error.to_string());
        if let Err(e) = self.jobs.update_status(job_id, patch) {
            warn!(job_id = %job_id, error = %e, "Failed to record job failure");
        }
    }
}
