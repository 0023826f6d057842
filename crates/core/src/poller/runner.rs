//! Poll-run driver: scan in-flight jobs and advance each one stage.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::blob::BlobStore;
use crate::editor::{PhotoEditor, RemoteStatus};
use crate::gallery::GalleryStore;
use crate::job::{JobPatch, JobStatus, JobStore, ProcessingJob};
use crate::metrics;

use super::types::{
    PollReport, PollerConfig, PollerError, EDIT_FAILED_MESSAGE, EXPORT_FAILED_MESSAGE,
};

/// What advancing one job did this run.
pub(super) enum Advance {
    /// Remote phase still running, or another run claimed the job.
    None,
    /// Moved one stage forward.
    Stage,
    /// Materialized and reached `complete`.
    Completed,
    /// Remote phase failed; job marked `failed`.
    RemoteFailed,
}

/// Advances in-flight jobs against the remote editing service.
pub struct JobPoller {
    pub(super) config: PollerConfig,
    pub(super) jobs: JobStore,
    pub(super) galleries: GalleryStore,
    pub(super) editor: Arc<dyn PhotoEditor>,
    pub(super) blobs: Arc<dyn BlobStore>,
}

impl JobPoller {
    /// Create a new poller.
    pub fn new(
        config: PollerConfig,
        jobs: JobStore,
        galleries: GalleryStore,
        editor: Arc<dyn PhotoEditor>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            config,
            jobs,
            galleries,
            editor,
            blobs,
        }
    }

    /// Run one poll pass over every in-flight job.
    ///
    /// Jobs are handled sequentially; an error on one job is recorded on
    /// that job and never stops the scan of the rest.
    pub async fn run_once(&self) -> PollReport {
        let start = Instant::now();
        let mut report = PollReport::default();

        let jobs = match self.jobs.list_active(self.config.scan_max_pages) {
            Ok(jobs) => jobs,
            Err(e) => {
                error!(error = %e, "Failed to scan in-flight jobs");
                return report;
            }
        };
        report.scanned = jobs.len();

        for job in &jobs {
            let outcome = match job.status {
                JobStatus::Processing => self.advance_processing(job).await,
                JobStatus::Exporting => self.advance_exporting(job).await,
                // list_active only returns the two statuses above
                _ => Ok(Advance::None),
            };

            match outcome {
                Ok(Advance::None) => {}
                Ok(Advance::Stage) => report.advanced += 1,
                Ok(Advance::Completed) => {
                    report.advanced += 1;
                    report.completed += 1;
                }
                Ok(Advance::RemoteFailed) => report.failed += 1,
                Err(e) => {
                    self.record_failure(&job.job_id, &e);
                    report.failed += 1;
                }
            }
        }

        metrics::POLL_RUNS.inc();
        metrics::POLL_DURATION.observe(start.elapsed().as_secs_f64());
        info!(
            scanned = report.scanned,
            advanced = report.advanced,
            completed = report.completed,
            failed = report.failed,
            "Poll run finished"
        );
        report
    }

    /// A `processing` job: check the remote edit and start the export once
    /// it completes.
    async fn advance_processing(&self, job: &ProcessingJob) -> Result<Advance, PollerError> {
        let project_id = Self::project_id(job)?;

        match self.editor.edit_status(project_id).await? {
            RemoteStatus::Completed => {
                // The job id doubles as the idempotency key, so a repeat of
                // this call after a lost status write is de-duplicated.
                self.editor.begin_export(project_id, &job.job_id).await?;
                self.transition(&job.job_id, JobStatus::Exporting, None)?;
                info!(job_id = %job.job_id, "Edit complete, export started");
                Ok(Advance::Stage)
            }
            RemoteStatus::Failed => {
                self.transition(&job.job_id, JobStatus::Failed, Some(EDIT_FAILED_MESSAGE))?;
                warn!(job_id = %job.job_id, "Remote edit failed");
                Ok(Advance::RemoteFailed)
            }
            RemoteStatus::InProgress(raw) => {
                debug!(job_id = %job.job_id, remote_status = %raw, "Edit still running");
                Ok(Advance::None)
            }
        }
    }

    /// An `exporting` job: check the remote export and materialize once it
    /// completes.
    async fn advance_exporting(&self, job: &ProcessingJob) -> Result<Advance, PollerError> {
        let project_id = Self::project_id(job)?;

        match self.editor.export_status(project_id).await? {
            RemoteStatus::Completed => {
                if self.materialize(job).await? {
                    Ok(Advance::Completed)
                } else {
                    Ok(Advance::None)
                }
            }
            RemoteStatus::Failed => {
                self.transition(&job.job_id, JobStatus::Failed, Some(EXPORT_FAILED_MESSAGE))?;
                warn!(job_id = %job.job_id, "Remote export failed");
                Ok(Advance::RemoteFailed)
            }
            RemoteStatus::InProgress(raw) => {
                debug!(job_id = %job.job_id, remote_status = %raw, "Export still running");
                Ok(Advance::None)
            }
        }
    }

    fn project_id(job: &ProcessingJob) -> Result<&str, PollerError> {
        job.remote_project_id
            .as_deref()
            .ok_or_else(|| PollerError::MissingProjectId(job.job_id.clone()))
    }

    pub(super) fn transition(
        &self,
        job_id: &str,
        status: JobStatus,
        error: Option<&str>,
    ) -> Result<(), PollerError> {
        let mut patch = JobPatch::new().with_status(status);
        if let Some(message) = error {
            patch = patch.with_error(message);
        }
        self.jobs.update_status(job_id, patch)?;
        metrics::JOB_TRANSITIONS
            .with_label_values(&[status.as_str()])
            .inc();
        Ok(())
    }

    /// Terminal handler for a job that errored during this run.
    fn record_failure(&self, job_id: &str, error: &PollerError) {
        warn!(job_id = %job_id, error = %error, "Job failed during poll run");
        metrics::POLL_JOB_FAILURES.inc();
        if let Err(e) = self.transition(job_id, JobStatus::Failed, Some(&error.to_string())) {
            error!(job_id = %job_id, error = %e, "Failed to record job failure");
        }
    }
}
