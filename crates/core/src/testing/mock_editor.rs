//! Mock editing service for testing.

use std::collections::{HashMap, HashSet, VecDeque};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::editor::{EditorError, ExportFile, PhotoEditor, RemoteStatus, UploadTarget};

/// A recorded service call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    /// Operation name (`create_project`, `begin_edit`, ...).
    pub op: String,
    /// Operation-specific detail (profile id, idempotency key, filename).
    pub detail: String,
}

/// Mock implementation of the [`PhotoEditor`] trait.
///
/// Provides controllable behavior for testing:
/// - Script edit/export statuses, one per poll
/// - Configure export output files and their bytes
/// - Withhold upload links for specific files
/// - Inject a one-shot error for any operation
/// - Record every call for assertions
pub struct MockEditor {
    project_id: RwLock<String>,
    edit_statuses: RwLock<VecDeque<RemoteStatus>>,
    export_statuses: RwLock<VecDeque<RemoteStatus>>,
    export_files: RwLock<Vec<ExportFile>>,
    downloads: RwLock<HashMap<String, Vec<u8>>>,
    missing_links: RwLock<HashSet<String>>,
    next_errors: RwLock<HashMap<String, EditorError>>,
    calls: RwLock<Vec<RecordedCall>>,
}

impl Default for MockEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEditor {
    /// Create a mock with an auto-assigned project id and no scripted
    /// statuses (phases report still-running until scripted).
    pub fn new() -> Self {
        Self {
            project_id: RwLock::new("project-1".to_string()),
            edit_statuses: RwLock::new(VecDeque::new()),
            export_statuses: RwLock::new(VecDeque::new()),
            export_files: RwLock::new(Vec::new()),
            downloads: RwLock::new(HashMap::new()),
            missing_links: RwLock::new(HashSet::new()),
            next_errors: RwLock::new(HashMap::new()),
            calls: RwLock::new(Vec::new()),
        }
    }

    /// Set the project id returned by `create_project`.
    pub async fn set_project_id(&self, id: &str) {
        *self.project_id.write().await = id.to_string();
    }

    /// Script the next edit status; one is consumed per `edit_status` call.
    pub async fn push_edit_status(&self, status: RemoteStatus) {
        self.edit_statuses.write().await.push_back(status);
    }

    /// Script the next export status.
    pub async fn push_export_status(&self, status: RemoteStatus) {
        self.export_statuses.write().await.push_back(status);
    }

    /// Configure the rendered output files and their bytes.
    pub async fn set_export_files(&self, files: Vec<(&str, &[u8])>) {
        let mut export_files = self.export_files.write().await;
        let mut downloads = self.downloads.write().await;
        export_files.clear();
        for (filename, bytes) in files {
            export_files.push(ExportFile {
                filename: filename.to_string(),
                url: format!("https://downloads.mock/{}", filename),
            });
            downloads.insert(filename.to_string(), bytes.to_vec());
        }
    }

    /// Issue an empty upload link for the given filename.
    pub async fn withhold_upload_link(&self, filename: &str) {
        self.missing_links.write().await.insert(filename.to_string());
    }

    /// Fail the next call to `op` with the given error.
    pub async fn set_next_error(&self, op: &str, error: EditorError) {
        self.next_errors.write().await.insert(op.to_string(), error);
    }

    /// All recorded calls in order.
    pub async fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Number of calls recorded for `op`.
    pub async fn call_count(&self, op: &str) -> usize {
        self.calls.read().await.iter().filter(|c| c.op == op).count()
    }

    async fn record(&self, op: &str, detail: impl Into<String>) {
        self.calls.write().await.push(RecordedCall {
            op: op.to_string(),
            detail: detail.into(),
        });
    }

    async fn take_error(&self, op: &str) -> Result<(), EditorError> {
        match self.next_errors.write().await.remove(op) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PhotoEditor for MockEditor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn create_project(&self) -> Result<String, EditorError> {
        self.record("create_project", "").await;
        self.take_error("create_project").await?;
        Ok(self.project_id.read().await.clone())
    }

    async fn upload_links(
        &self,
        project_id: &str,
        filenames: &[String],
    ) -> Result<Vec<UploadTarget>, EditorError> {
        self.record("upload_links", filenames.join(",")).await;
        self.take_error("upload_links").await?;

        let missing = self.missing_links.read().await;
        Ok(filenames
            .iter()
            .map(|filename| UploadTarget {
                filename: filename.clone(),
                url: if missing.contains(filename) {
                    String::new()
                } else {
                    format!("https://uploads.mock/{}/{}", project_id, filename)
                },
            })
            .collect())
    }

    async fn upload(&self, target: &UploadTarget, bytes: Vec<u8>) -> Result<(), EditorError> {
        self.record("upload", format!("{}:{}", target.filename, bytes.len()))
            .await;
        self.take_error("upload").await
    }

    async fn begin_edit(&self, _project_id: &str, profile_id: &str) -> Result<(), EditorError> {
        self.record("begin_edit", profile_id).await;
        self.take_error("begin_edit").await
    }

    async fn edit_status(&self, _project_id: &str) -> Result<RemoteStatus, EditorError> {
        self.record("edit_status", "").await;
        self.take_error("edit_status").await?;
        Ok(self
            .edit_statuses
            .write()
            .await
            .pop_front()
            .unwrap_or(RemoteStatus::InProgress("in_queue".to_string())))
    }

    async fn begin_export(
        &self,
        _project_id: &str,
        idempotency_key: &str,
    ) -> Result<(), EditorError> {
        self.record("begin_export", idempotency_key).await;
        self.take_error("begin_export").await
    }

    async fn export_status(&self, _project_id: &str) -> Result<RemoteStatus, EditorError> {
        self.record("export_status", "").await;
        self.take_error("export_status").await?;
        Ok(self
            .export_statuses
            .write()
            .await
            .pop_front()
            .unwrap_or(RemoteStatus::InProgress("in_queue".to_string())))
    }

    async fn export_downloads(&self, _project_id: &str) -> Result<Vec<ExportFile>, EditorError> {
        self.record("export_downloads", "").await;
        self.take_error("export_downloads").await?;
        Ok(self.export_files.read().await.clone())
    }

    async fn download(&self, file: &ExportFile) -> Result<Vec<u8>, EditorError> {
        self.record("download", file.filename.clone()).await;
        self.take_error("download").await?;
        Ok(self
            .downloads
            .read()
            .await
            .get(&file.filename)
            .cloned()
            .unwrap_or_else(|| file.filename.clone().into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_scripted_statuses_are_consumed_in_order() {
        let editor = MockEditor::new();
        editor
            .push_edit_status(RemoteStatus::InProgress("running".into()))
            .await;
        editor.push_edit_status(RemoteStatus::Completed).await;

        assert_eq!(
            editor.edit_status("p").await.unwrap(),
            RemoteStatus::InProgress("running".into())
        );
        assert_eq!(editor.edit_status("p").await.unwrap(), RemoteStatus::Completed);
        // unscripted polls report still-running
        assert!(matches!(
            editor.edit_status("p").await.unwrap(),
            RemoteStatus::InProgress(_)
        ));
    }

    #[tokio::test]
    async fn test_error_injection_is_one_shot() {
        let editor = MockEditor::new();
        editor
            .set_next_error("create_project", EditorError::api(500, "boom"))
            .await;

        assert!(editor.create_project().await.is_err());
        assert!(editor.create_project().await.is_ok());
    }

    #[tokio::test]
    async fn test_withheld_link_is_empty() {
        let editor = MockEditor::new();
        editor.withhold_upload_link("b.cr2").await;

        let targets = editor
            .upload_links("p", &["a.cr2".to_string(), "b.cr2".to_string()])
            .await
            .unwrap();
        assert!(!targets[0].url.is_empty());
        assert!(targets[1].url.is_empty());
    }

    #[tokio::test]
    async fn test_recorded_calls() {
        let editor = MockEditor::new();
        editor.create_project().await.unwrap();
        editor.begin_edit("p", "profile-raw").await.unwrap();

        let calls = editor.recorded_calls().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].op, "begin_edit");
        assert_eq!(calls[1].detail, "profile-raw");
        assert_eq!(editor.call_count("create_project").await, 1);
    }
}
