//! Result materialization: pull finished output out of the remote service
//! and into our own storage and gallery records.

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::blob::output_key;
use crate::gallery::GalleryImage;
use crate::job::{JobPatch, JobSource, JobStatus, ProcessingJob};
use crate::metrics;

use super::runner::JobPoller;
use super::types::PollerError;

impl JobPoller {
    /// Materialize a job whose export completed.
    ///
    /// Returns `false` when the compare-and-set claim on the job was lost
    /// to a concurrent poll run; `true` when the job reached `complete`.
    /// Any error after the claim is recorded by the caller, so the
    /// transient `downloading` state always resolves within this run.
    pub(super) async fn materialize(&self, job: &ProcessingJob) -> Result<bool, PollerError> {
        if !self
            .jobs
            .claim(&job.job_id, JobStatus::Exporting, JobStatus::Downloading)?
        {
            debug!(job_id = %job.job_id, "Lost materialization claim, skipping");
            return Ok(false);
        }

        let project_id = job
            .remote_project_id
            .as_deref()
            .ok_or_else(|| PollerError::MissingProjectId(job.job_id.clone()))?;

        let files = self.editor.export_downloads(project_id).await?;
        // A completed export with zero files is an error, not a success
        // with no output.
        if files.is_empty() {
            return Err(PollerError::EmptyExport);
        }

        let source = job.effective_source();
        let mut result_keys = Vec::with_capacity(files.len());
        for file in &files {
            let bytes = self.editor.download(file).await?;
            let key = output_key(source, job.gallery_id.as_deref(), &file.filename);
            self.blobs.put(&key, bytes).await?;
            metrics::FILES_MATERIALIZED.inc();
            result_keys.push(key);
        }

        // Imagen output waits in the review queue; everything else is
        // catalogued into the destination gallery right away.
        if source != JobSource::Imagen && !result_keys.is_empty() {
            if let Some(gallery_id) = job.gallery_id.as_deref() {
                let entries: Vec<GalleryImage> = result_keys
                    .iter()
                    .map(|key| GalleryImage::new(key.clone()))
                    .collect();
                self.galleries.append_images(gallery_id, &entries)?;
                debug!(
                    job_id = %job.job_id,
                    gallery_id = %gallery_id,
                    images = entries.len(),
                    "Appended output to gallery"
                );
            }
        }

        // Output is durably stored by now; a failed cleanup of staged
        // originals is logged, not escalated.
        let failed = self.blobs.delete_many(&job.raw_keys).await;
        if !failed.is_empty() {
            warn!(
                job_id = %job.job_id,
                failed = failed.len(),
                "Some staged originals could not be deleted"
            );
        }

        let stored = result_keys.len();
        self.jobs.update_status(
            &job.job_id,
            JobPatch::new()
                .with_status(JobStatus::Complete)
                .with_result_keys(result_keys)
                .with_completed_at(Utc::now()),
        )?;
        metrics::JOB_TRANSITIONS
            .with_label_values(&[JobStatus::Complete.as_str()])
            .inc();

        info!(job_id = %job.job_id, files = stored, "Job complete");
        Ok(true)
    }
}
