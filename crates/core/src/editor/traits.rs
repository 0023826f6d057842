//! Trait definition for the remote photo-editing service.

use async_trait::async_trait;

use super::types::{EditorError, ExportFile, RemoteStatus, UploadTarget};

/// A remote photo-editing service.
///
/// One project per processing job. The edit and export phases are driven
/// separately: editing produces adjusted settings, exporting renders the
/// final output images.
#[async_trait]
pub trait PhotoEditor: Send + Sync {
    /// Returns the name of this editor implementation.
    fn name(&self) -> &str;

    /// Create a new project and return its id.
    async fn create_project(&self) -> Result<String, EditorError>;

    /// Request presigned upload links for the given file basenames in a
    /// single batched call.
    async fn upload_links(
        &self,
        project_id: &str,
        filenames: &[String],
    ) -> Result<Vec<UploadTarget>, EditorError>;

    /// Upload file bytes to a presigned link.
    async fn upload(&self, target: &UploadTarget, bytes: Vec<u8>) -> Result<(), EditorError>;

    /// Start editing the project with the given profile. This is the only
    /// call that carries the profile.
    async fn begin_edit(&self, project_id: &str, profile_id: &str) -> Result<(), EditorError>;

    /// Current status of the edit phase.
    async fn edit_status(&self, project_id: &str) -> Result<RemoteStatus, EditorError>;

    /// Start rendering final output images. `idempotency_key` de-duplicates
    /// a repeated call after a lost status write.
    async fn begin_export(
        &self,
        project_id: &str,
        idempotency_key: &str,
    ) -> Result<(), EditorError>;

    /// Current status of the export phase.
    async fn export_status(&self, project_id: &str) -> Result<RemoteStatus, EditorError>;

    /// Presigned download links for the rendered output files.
    async fn export_downloads(&self, project_id: &str) -> Result<Vec<ExportFile>, EditorError>;

    /// Download one rendered output file.
    async fn download(&self, file: &ExportFile) -> Result<Vec<u8>, EditorError>;
}
