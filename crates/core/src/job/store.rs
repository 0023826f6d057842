//! Job record storage facade.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use tracing::warn;

use crate::store::{Condition, Document, DocumentStore, Patch, ScanFilter, StoreError};

use super::types::{JobSource, JobStatus, ProcessingJob};

/// Logical table holding job records.
pub const JOBS_TABLE: &str = "jobs";

/// Fixed job-kind prefix; record keys are `job#<job_id>`.
const JOB_KEY_PREFIX: &str = "job#";

/// Error type for job record operations.
#[derive(Debug, thiserror::Error)]
pub enum JobStoreError {
    /// Job not found.
    #[error("Job not found: {0}")]
    NotFound(String),

    /// Job record could not be decoded.
    #[error("Malformed job record: {0}")]
    Malformed(String),

    /// Underlying store error.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A status-transition patch for one job.
///
/// Compiled down to a store [`Patch`]; `updated_at` is stamped on every
/// transition regardless of which fields the patch names.
#[derive(Debug, Clone, Default)]
pub struct JobPatch {
    status: Option<JobStatus>,
    source: Option<JobSource>,
    remote_project_id: Option<String>,
    result_keys: Option<Vec<String>>,
    error: Option<String>,
    completed_at: Option<DateTime<Utc>>,
}

impl JobPatch {
    /// Create an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the job status.
    pub fn with_status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Persist the output routing discriminator.
    pub fn with_source(mut self, source: JobSource) -> Self {
        self.source = Some(source);
        self
    }

    /// Record the remote project id.
    pub fn with_remote_project_id(mut self, project_id: impl Into<String>) -> Self {
        self.remote_project_id = Some(project_id.into());
        self
    }

    /// Record the stored output keys.
    pub fn with_result_keys(mut self, keys: Vec<String>) -> Self {
        self.result_keys = Some(keys);
        self
    }

    /// Record a failure message.
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Record the completion timestamp.
    pub fn with_completed_at(mut self, at: DateTime<Utc>) -> Self {
        self.completed_at = Some(at);
        self
    }

    fn into_patch(self, now: DateTime<Utc>) -> Patch {
        let mut patch = Patch::new().set("updated_at", json!(now));
        if let Some(status) = self.status {
            patch = patch.set("status", status.as_str());
        }
        if let Some(source) = self.source {
            patch = patch.set("source", source.as_str());
        }
        if let Some(project_id) = self.remote_project_id {
            patch = patch.set("remote_project_id", project_id);
        }
        if let Some(keys) = self.result_keys {
            patch = patch.set("result_keys", json!(keys));
        }
        if let Some(error) = self.error {
            patch = patch.set("error", error);
        }
        if let Some(at) = self.completed_at {
            patch = patch.set("completed_at", json!(at));
        }
        patch
    }
}

/// Typed facade over the document store for job records.
#[derive(Clone)]
pub struct JobStore {
    store: Arc<dyn DocumentStore>,
}

impl JobStore {
    /// Create a job store over the given document store.
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    fn key(job_id: &str) -> String {
        format!("{}{}", JOB_KEY_PREFIX, job_id)
    }

    fn to_document(job: &ProcessingJob) -> Result<Document, JobStoreError> {
        match serde_json::to_value(job) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(JobStoreError::Malformed(format!(
                "job serialized to non-object: {}",
                other
            ))),
            Err(e) => Err(JobStoreError::Malformed(e.to_string())),
        }
    }

    fn from_document(doc: Document) -> Result<ProcessingJob, JobStoreError> {
        serde_json::from_value(Value::Object(doc))
            .map_err(|e| JobStoreError::Malformed(e.to_string()))
    }

    /// Store a freshly created job record.
    pub fn create(&self, job: &ProcessingJob) -> Result<(), JobStoreError> {
        let doc = Self::to_document(job)?;
        self.store.put(JOBS_TABLE, &Self::key(&job.job_id), doc)?;
        Ok(())
    }

    /// Fetch a job record.
    pub fn get(&self, job_id: &str) -> Result<Option<ProcessingJob>, JobStoreError> {
        self.store
            .get(JOBS_TABLE, &Self::key(job_id))?
            .map(Self::from_document)
            .transpose()
    }

    /// Apply a status transition. Every transition funnels through here so
    /// `updated_at` is always stamped.
    pub fn update_status(&self, job_id: &str, patch: JobPatch) -> Result<(), JobStoreError> {
        let patch = patch.into_patch(Utc::now());
        self.store.update(JOBS_TABLE, &Self::key(job_id), patch)?;
        Ok(())
    }

    /// Claim a transition with compare-and-set: moves the job from `from`
    /// to `to` only if it is still in `from`. Returns `false` when another
    /// writer got there first.
    pub fn claim(&self, job_id: &str, from: JobStatus, to: JobStatus) -> Result<bool, JobStoreError> {
        let patch = JobPatch::new().with_status(to).into_patch(Utc::now());
        let condition = Condition::field_eq("status", from.as_str());
        let claimed = self
            .store
            .update_if(JOBS_TABLE, &Self::key(job_id), patch, &condition)?;
        Ok(claimed)
    }

    /// List jobs, optionally filtered by status. `max_pages` caps the
    /// scan.
    pub fn list(
        &self,
        status: Option<JobStatus>,
        max_pages: usize,
    ) -> Result<Vec<ProcessingJob>, JobStoreError> {
        let filter = status.map(|s| ScanFilter::field_eq("status", s.as_str()));
        let docs = self
            .store
            .query_all(JOBS_TABLE, filter.as_ref(), 100, max_pages)?;

        let mut jobs = Vec::with_capacity(docs.len());
        for doc in docs {
            match Self::from_document(doc) {
                Ok(job) => jobs.push(job),
                Err(e) => warn!(error = %e, "Skipping malformed job record in scan"),
            }
        }
        Ok(jobs)
    }

    /// All jobs the poller owns: status `processing` or `exporting`.
    /// `max_pages` caps the scan; malformed records are skipped with a
    /// warning rather than poisoning the whole scan.
    pub fn list_active(&self, max_pages: usize) -> Result<Vec<ProcessingJob>, JobStoreError> {
        let filter = ScanFilter::field_in(
            "status",
            vec![
                json!(JobStatus::Processing.as_str()),
                json!(JobStatus::Exporting.as_str()),
            ],
        );

        let docs = self
            .store
            .query_all(JOBS_TABLE, Some(&filter), 100, max_pages)?;

        let mut jobs = Vec::with_capacity(docs.len());
        for doc in docs {
            match Self::from_document(doc) {
                Ok(job) => jobs.push(job),
                Err(e) => warn!(error = %e, "Skipping malformed job record in scan"),
            }
        }
        Ok(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteDocumentStore;

    fn job_store() -> JobStore {
        JobStore::new(Arc::new(SqliteDocumentStore::in_memory().unwrap()))
    }

    fn staged(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("staging/IMG_{:04}.CR2", i)).collect()
    }

    #[test]
    fn test_create_and_get() {
        let store = job_store();
        let job = ProcessingJob::new("j-1", Some("g-1".into()), staged(2));
        store.create(&job).unwrap();

        let fetched = store.get("j-1").unwrap().unwrap();
        assert_eq!(fetched, job);
    }

    #[test]
    fn test_get_missing() {
        let store = job_store();
        assert!(store.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_update_status_stamps_updated_at() {
        let store = job_store();
        let job = ProcessingJob::new("j-1", None, staged(1));
        store.create(&job).unwrap();

        store
            .update_status("j-1", JobPatch::new().with_status(JobStatus::Uploading))
            .unwrap();

        let fetched = store.get("j-1").unwrap().unwrap();
        assert_eq!(fetched.status, JobStatus::Uploading);
        assert!(fetched.updated_at >= job.updated_at);
        // untouched fields survive the patch
        assert_eq!(fetched.raw_keys, job.raw_keys);
        assert_eq!(fetched.created_at, job.created_at);
    }

    #[test]
    fn test_failure_patch_records_error() {
        let store = job_store();
        store
            .create(&ProcessingJob::new("j-1", None, staged(1)))
            .unwrap();

        store
            .update_status(
                "j-1",
                JobPatch::new()
                    .with_status(JobStatus::Failed)
                    .with_error("HTTP 500: server error"),
            )
            .unwrap();

        let fetched = store.get("j-1").unwrap().unwrap();
        assert_eq!(fetched.status, JobStatus::Failed);
        assert_eq!(fetched.error.as_deref(), Some("HTTP 500: server error"));
    }

    #[test]
    fn test_claim_succeeds_once() {
        let store = job_store();
        let mut job = ProcessingJob::new("j-1", None, staged(1));
        job.status = JobStatus::Exporting;
        store.create(&job).unwrap();

        assert!(store
            .claim("j-1", JobStatus::Exporting, JobStatus::Downloading)
            .unwrap());
        // second claim loses: the job is no longer exporting
        assert!(!store
            .claim("j-1", JobStatus::Exporting, JobStatus::Downloading)
            .unwrap());

        let fetched = store.get("j-1").unwrap().unwrap();
        assert_eq!(fetched.status, JobStatus::Downloading);
    }

    #[test]
    fn test_list_active_ignores_other_statuses() {
        let store = job_store();
        for (id, status) in [
            ("j-1", JobStatus::Queued),
            ("j-2", JobStatus::Uploading),
            ("j-3", JobStatus::Processing),
            ("j-4", JobStatus::Exporting),
            ("j-5", JobStatus::Downloading),
            ("j-6", JobStatus::Complete),
            ("j-7", JobStatus::Failed),
        ] {
            let mut job = ProcessingJob::new(id, None, staged(1));
            job.status = status;
            store.create(&job).unwrap();
        }

        let active = store.list_active(10).unwrap();
        let mut ids: Vec<_> = active.iter().map(|j| j.job_id.as_str()).collect();
        ids.sort();
        assert_eq!(ids, vec!["j-3", "j-4"]);
    }
}
