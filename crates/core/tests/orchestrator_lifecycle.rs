//! Orchestrator lifecycle integration tests.
//!
//! These tests drive one orchestration at a time against mock
//! collaborators and assert the job record's outcome:
//! queued -> uploading -> processing, or queued -> failed.

use std::sync::Arc;

use darkroom_core::{
    editor::EditorError,
    testing::{fixtures, MemoryBlobStore, MockEditor},
    JobOrchestrator, JobSource, JobStatus, JobStore, OrchestratorConfig, ProcessRequest,
    ProcessingJob, SqliteDocumentStore,
};

/// Test helper wiring an orchestrator to mock collaborators.
struct TestHarness {
    jobs: JobStore,
    editor: Arc<MockEditor>,
    blobs: Arc<MemoryBlobStore>,
}

impl TestHarness {
    fn new() -> Self {
        let store = Arc::new(SqliteDocumentStore::in_memory().expect("store"));
        Self {
            jobs: JobStore::new(store),
            editor: Arc::new(MockEditor::new()),
            blobs: Arc::new(MemoryBlobStore::new()),
        }
    }

    fn orchestrator(&self) -> JobOrchestrator {
        self.orchestrator_with(OrchestratorConfig {
            upload_batch_size: 5,
            raw_profile_id: Some("profile-raw".to_string()),
            jpg_profile_id: Some("profile-jpg".to_string()),
            credential_configured: true,
        })
    }

    fn orchestrator_with(&self, config: OrchestratorConfig) -> JobOrchestrator {
        JobOrchestrator::new(
            config,
            self.jobs.clone(),
            Arc::clone(&self.editor) as Arc<dyn darkroom_core::PhotoEditor>,
            Arc::clone(&self.blobs) as Arc<dyn darkroom_core::BlobStore>,
        )
    }

    /// Create the job record and stage its files in object storage.
    async fn stage_job(&self, job_id: &str, raw_keys: &[String]) {
        let job = ProcessingJob::new(job_id, None, raw_keys.to_vec());
        self.jobs.create(&job).expect("create job");
        for key in raw_keys {
            self.blobs.insert(key, b"image-bytes").await;
        }
    }

    fn request(&self, job_id: &str, raw_keys: Vec<String>) -> ProcessRequest {
        ProcessRequest {
            job_id: job_id.to_string(),
            gallery_id: None,
            raw_keys,
            source: None,
            profile_id: None,
        }
    }
}

#[tokio::test]
async fn test_successful_orchestration_ends_processing() {
    let harness = TestHarness::new();
    let raw_keys = fixtures::staged_raw_keys(2);
    harness.stage_job("j-1", &raw_keys).await;
    harness.editor.set_project_id("proj-42").await;

    harness
        .orchestrator()
        .run(harness.request("j-1", raw_keys.clone()))
        .await
        .expect("orchestration should succeed");

    let job = harness.jobs.get("j-1").unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Processing);
    assert_eq!(job.remote_project_id.as_deref(), Some("proj-42"));
    assert_eq!(job.raw_keys, raw_keys);
    assert!(job.error.is_none());
}

#[tokio::test]
async fn test_remote_calls_run_in_order() {
    let harness = TestHarness::new();
    let raw_keys = fixtures::staged_raw_keys(2);
    harness.stage_job("j-1", &raw_keys).await;

    harness
        .orchestrator()
        .run(harness.request("j-1", raw_keys))
        .await
        .unwrap();

    let ops: Vec<String> = harness
        .editor
        .recorded_calls()
        .await
        .into_iter()
        .map(|c| c.op)
        .collect();
    assert_eq!(
        ops,
        vec![
            "create_project",
            "upload_links",
            "upload",
            "upload",
            "begin_edit"
        ]
    );
}

#[tokio::test]
async fn test_upload_links_requested_by_basename() {
    let harness = TestHarness::new();
    let raw_keys = vec!["staging/shoots/2026/IMG_0001.CR2".to_string()];
    harness.stage_job("j-1", &raw_keys).await;

    harness
        .orchestrator()
        .run(harness.request("j-1", raw_keys))
        .await
        .unwrap();

    let calls = harness.editor.recorded_calls().await;
    let links_call = calls.iter().find(|c| c.op == "upload_links").unwrap();
    assert_eq!(links_call.detail, "IMG_0001.CR2");
}

#[tokio::test]
async fn test_profile_rides_on_the_edit_call() {
    let harness = TestHarness::new();
    let raw_keys = fixtures::staged_raw_keys(1);
    harness.stage_job("j-1", &raw_keys).await;

    harness
        .orchestrator()
        .run(harness.request("j-1", raw_keys))
        .await
        .unwrap();

    let calls = harness.editor.recorded_calls().await;
    let edit_call = calls.iter().find(|c| c.op == "begin_edit").unwrap();
    assert_eq!(edit_call.detail, "profile-raw");
}

#[tokio::test]
async fn test_jpg_batch_uses_jpg_profile() {
    let harness = TestHarness::new();
    let raw_keys = fixtures::staged_jpg_keys(3);
    harness.stage_job("j-1", &raw_keys).await;

    harness
        .orchestrator()
        .run(harness.request("j-1", raw_keys))
        .await
        .unwrap();

    let calls = harness.editor.recorded_calls().await;
    let edit_call = calls.iter().find(|c| c.op == "begin_edit").unwrap();
    assert_eq!(edit_call.detail, "profile-jpg");
}

#[tokio::test]
async fn test_explicit_profile_override() {
    let harness = TestHarness::new();
    let raw_keys = fixtures::staged_jpg_keys(1);
    harness.stage_job("j-1", &raw_keys).await;

    let mut request = harness.request("j-1", raw_keys);
    request.profile_id = Some("profile-custom".to_string());
    harness.orchestrator().run(request).await.unwrap();

    let calls = harness.editor.recorded_calls().await;
    let edit_call = calls.iter().find(|c| c.op == "begin_edit").unwrap();
    assert_eq!(edit_call.detail, "profile-custom");
}

#[tokio::test]
async fn test_source_is_persisted_on_the_job() {
    let harness = TestHarness::new();
    let raw_keys = fixtures::staged_raw_keys(1);
    harness.stage_job("j-1", &raw_keys).await;

    let mut request = harness.request("j-1", raw_keys);
    request.source = Some(JobSource::Imagen);
    harness.orchestrator().run(request).await.unwrap();

    let job = harness.jobs.get("j-1").unwrap().unwrap();
    assert_eq!(job.source, Some(JobSource::Imagen));
}

#[tokio::test]
async fn test_project_creation_failure_records_status_and_body() {
    let harness = TestHarness::new();
    let raw_keys = fixtures::staged_raw_keys(1);
    harness.stage_job("j-1", &raw_keys).await;
    harness
        .editor
        .set_next_error("create_project", EditorError::api(500, "internal server error"))
        .await;

    let result = harness
        .orchestrator()
        .run(harness.request("j-1", raw_keys))
        .await;
    assert!(result.is_err());

    let job = harness.jobs.get("j-1").unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    let error = job.error.expect("failed job carries an error");
    assert!(error.contains("500"), "error should name the status: {}", error);
    assert!(
        error.contains("internal server error"),
        "error should carry the body: {}",
        error
    );
}

#[tokio::test]
async fn test_missing_credential_fails_without_remote_calls() {
    let harness = TestHarness::new();
    let raw_keys = fixtures::staged_raw_keys(1);
    harness.stage_job("j-1", &raw_keys).await;

    let orchestrator = harness.orchestrator_with(OrchestratorConfig {
        upload_batch_size: 5,
        raw_profile_id: Some("profile-raw".to_string()),
        jpg_profile_id: None,
        credential_configured: false,
    });
    let result = orchestrator.run(harness.request("j-1", raw_keys)).await;
    assert!(result.is_err());

    let job = harness.jobs.get("j-1").unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.is_some());
    assert_eq!(harness.editor.recorded_calls().await.len(), 0);
}

#[tokio::test]
async fn test_missing_profile_fails_without_remote_calls() {
    let harness = TestHarness::new();
    let raw_keys = fixtures::staged_raw_keys(1);
    harness.stage_job("j-1", &raw_keys).await;

    let orchestrator = harness.orchestrator_with(OrchestratorConfig {
        upload_batch_size: 5,
        raw_profile_id: None,
        jpg_profile_id: None,
        credential_configured: true,
    });
    assert!(orchestrator.run(harness.request("j-1", raw_keys)).await.is_err());

    let job = harness.jobs.get("j-1").unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(harness.editor.recorded_calls().await.len(), 0);
}

#[tokio::test]
async fn test_missing_upload_link_is_a_hard_failure() {
    let harness = TestHarness::new();
    let raw_keys = fixtures::staged_raw_keys(2);
    harness.stage_job("j-1", &raw_keys).await;
    harness.editor.withhold_upload_link("IMG_0001.CR2").await;

    let result = harness
        .orchestrator()
        .run(harness.request("j-1", raw_keys))
        .await;
    assert!(result.is_err());

    let job = harness.jobs.get("j-1").unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error.unwrap().contains("IMG_0001.CR2"));
    // no upload happened and the edit was never started
    assert_eq!(harness.editor.call_count("upload").await, 0);
    assert_eq!(harness.editor.call_count("begin_edit").await, 0);
}

#[tokio::test]
async fn test_missing_staged_file_fails_the_job() {
    let harness = TestHarness::new();
    let raw_keys = fixtures::staged_raw_keys(1);
    // create the record but do not stage the bytes
    harness
        .jobs
        .create(&ProcessingJob::new("j-1", None, raw_keys.clone()))
        .unwrap();

    let result = harness
        .orchestrator()
        .run(harness.request("j-1", raw_keys))
        .await;
    assert!(result.is_err());

    let job = harness.jobs.get("j-1").unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(harness.editor.call_count("begin_edit").await, 0);
}

#[tokio::test]
async fn test_large_batch_uploads_every_file() {
    let harness = TestHarness::new();
    let raw_keys = fixtures::staged_raw_keys(12);
    harness.stage_job("j-1", &raw_keys).await;

    let orchestrator = harness.orchestrator_with(OrchestratorConfig {
        upload_batch_size: 5,
        raw_profile_id: Some("profile-raw".to_string()),
        jpg_profile_id: Some("profile-jpg".to_string()),
        credential_configured: true,
    });
    orchestrator
        .run(harness.request("j-1", raw_keys))
        .await
        .unwrap();

    assert_eq!(harness.editor.call_count("upload").await, 12);
    let job = harness.jobs.get("j-1").unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Processing);
}

#[tokio::test]
async fn test_empty_batch_fails_fast() {
    let harness = TestHarness::new();
    harness
        .jobs
        .create(&ProcessingJob::new("j-1", None, vec![]))
        .unwrap();

    let result = harness.orchestrator().run(harness.request("j-1", vec![])).await;
    assert!(result.is_err());

    let job = harness.jobs.get("j-1").unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(harness.editor.recorded_calls().await.len(), 0);
}
