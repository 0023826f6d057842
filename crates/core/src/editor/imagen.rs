//! Imagen editing service implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::config::EditorConfig;

use super::envelope::{decode_envelope, decode_project_id};
use super::retry::{with_retries, RetryPolicy};
use super::traits::PhotoEditor;
use super::types::{EditorError, ExportFile, RemoteStatus, UploadTarget};

/// API-key header used by the editing service.
const API_KEY_HEADER: &str = "x-api-key";

/// Idempotency header for the begin-export call.
const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Imagen editing service client.
pub struct ImagenEditor {
    client: Client,
    config: EditorConfig,
    policy: RetryPolicy,
}

impl ImagenEditor {
    /// Create a new client with the given configuration.
    pub fn new(config: EditorConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            policy: RetryPolicy::default(),
        }
    }

    /// Override the retry policy.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Build a service URL for the given path.
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn project_path(&self, project_id: &str, suffix: &str) -> String {
        self.url(&format!(
            "v1/projects/{}{}",
            urlencoding::encode(project_id),
            suffix
        ))
    }

    /// Send a request and return the response body, mapping transport
    /// failures and non-2xx statuses to [`EditorError`].
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Vec<u8>, EditorError> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                EditorError::Timeout
            } else if e.is_connect() {
                EditorError::Connection(e.to_string())
            } else {
                EditorError::Request(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EditorError::api(status.as_u16(), &body));
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| EditorError::Request(e.to_string()))
    }

    /// An authenticated request to the service API (not to presigned
    /// links).
    fn api_request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.header(API_KEY_HEADER, &self.config.api_key)
    }
}

#[async_trait]
impl PhotoEditor for ImagenEditor {
    fn name(&self) -> &str {
        "imagen"
    }

    async fn create_project(&self) -> Result<String, EditorError> {
        let url = self.url("v1/projects");
        let body = with_retries(&self.policy, || {
            self.send(self.api_request(self.client.post(&url)).json(&json!({})))
        })
        .await?;

        let project_id = decode_project_id(&body)?;
        debug!(project_id = %project_id, "Created remote project");
        Ok(project_id)
    }

    async fn upload_links(
        &self,
        project_id: &str,
        filenames: &[String],
    ) -> Result<Vec<UploadTarget>, EditorError> {
        let url = self.project_path(project_id, "/upload-links");
        let payload = json!({ "files": filenames });
        let body = with_retries(&self.policy, || {
            self.send(self.api_request(self.client.post(&url)).json(&payload))
        })
        .await?;

        let parsed: UploadLinksResponse = decode_envelope(&body)?;
        Ok(parsed
            .files
            .into_iter()
            .map(|f| UploadTarget {
                filename: f.filename,
                url: f.url.unwrap_or_default(),
            })
            .collect())
    }

    async fn upload(&self, target: &UploadTarget, bytes: Vec<u8>) -> Result<(), EditorError> {
        // Presigned links are single-use; no API header, no retry.
        self.send(self.client.put(&target.url).body(bytes)).await?;
        Ok(())
    }

    async fn begin_edit(&self, project_id: &str, profile_id: &str) -> Result<(), EditorError> {
        let url = self.project_path(project_id, "/edit");
        let payload = json!({ "profile_key": profile_id });
        with_retries(&self.policy, || {
            self.send(self.api_request(self.client.post(&url)).json(&payload))
        })
        .await?;
        Ok(())
    }

    async fn edit_status(&self, project_id: &str) -> Result<RemoteStatus, EditorError> {
        let url = self.project_path(project_id, "/edit/status");
        let body = with_retries(&self.policy, || {
            self.send(self.api_request(self.client.get(&url)))
        })
        .await?;

        let parsed: StatusResponse = decode_envelope(&body)?;
        Ok(RemoteStatus::parse(&parsed.status))
    }

    async fn begin_export(
        &self,
        project_id: &str,
        idempotency_key: &str,
    ) -> Result<(), EditorError> {
        let url = self.project_path(project_id, "/export");
        with_retries(&self.policy, || {
            self.send(
                self.api_request(self.client.post(&url))
                    .header(IDEMPOTENCY_HEADER, idempotency_key)
                    .json(&json!({})),
            )
        })
        .await?;
        Ok(())
    }

    async fn export_status(&self, project_id: &str) -> Result<RemoteStatus, EditorError> {
        let url = self.project_path(project_id, "/export/status");
        let body = with_retries(&self.policy, || {
            self.send(self.api_request(self.client.get(&url)))
        })
        .await?;

        let parsed: StatusResponse = decode_envelope(&body)?;
        Ok(RemoteStatus::parse(&parsed.status))
    }

    async fn export_downloads(&self, project_id: &str) -> Result<Vec<ExportFile>, EditorError> {
        // Export download links only; the edit endpoint serves XMP
        // sidecars, which are not usable images.
        let url = self.project_path(project_id, "/export/files");
        let body = with_retries(&self.policy, || {
            self.send(self.api_request(self.client.get(&url)))
        })
        .await?;

        let parsed: ExportFilesResponse = decode_envelope(&body)?;
        Ok(parsed
            .files
            .into_iter()
            .filter_map(|f| {
                f.url.map(|url| ExportFile {
                    filename: f.filename,
                    url,
                })
            })
            .collect())
    }

    async fn download(&self, file: &ExportFile) -> Result<Vec<u8>, EditorError> {
        self.send(self.client.get(&file.url)).await
    }
}

// Editing service API response types.

#[derive(Debug, Deserialize)]
struct StatusResponse {
    #[serde(alias = "state")]
    status: String,
}

#[derive(Debug, Deserialize)]
struct UploadLinksResponse {
    #[serde(alias = "links", alias = "upload_links")]
    files: Vec<UploadLinkEntry>,
}

#[derive(Debug, Deserialize)]
struct UploadLinkEntry {
    #[serde(alias = "name", alias = "file_name")]
    filename: String,
    #[serde(default, alias = "link", alias = "upload_url")]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExportFilesResponse {
    #[serde(alias = "links", alias = "download_links")]
    files: Vec<ExportFileEntry>,
}

#[derive(Debug, Deserialize)]
struct ExportFileEntry {
    #[serde(alias = "name", alias = "file_name")]
    filename: String,
    #[serde(default, alias = "link", alias = "download_url")]
    url: Option<String>,
}
