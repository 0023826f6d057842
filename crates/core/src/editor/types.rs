//! Types for the remote editing service client.

/// Maximum response-body length carried into error messages.
const ERROR_BODY_LIMIT: usize = 200;

/// Error type for remote editing service operations.
#[derive(Debug, thiserror::Error)]
pub enum EditorError {
    /// Non-2xx response from the service.
    #[error("HTTP {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// Could not reach the service.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Request timed out.
    #[error("Request timed out")]
    Timeout,

    /// Request failed before a status was received.
    #[error("Request failed: {0}")]
    Request(String),

    /// Response body did not match any expected shape.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl EditorError {
    /// Build an API error with the body truncated for error messages.
    pub fn api(status: u16, body: &str) -> Self {
        EditorError::Api {
            status,
            body: body.chars().take(ERROR_BODY_LIMIT).collect(),
        }
    }

    /// Returns true if retrying the call may succeed: timeouts, transport
    /// failures, and 5xx responses. 4xx responses and malformed bodies are
    /// permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            EditorError::Timeout | EditorError::Connection(_) | EditorError::Request(_) => true,
            EditorError::Api { status, .. } => *status >= 500,
            EditorError::MalformedResponse(_) => false,
        }
    }
}

/// Remote phase status, normalized from the service's status strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    /// The phase finished successfully.
    Completed,
    /// The phase failed remotely.
    Failed,
    /// Anything else: still queued or running; re-checked next poll.
    InProgress(String),
}

impl RemoteStatus {
    /// Normalize a raw status string.
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "completed" | "complete" | "done" => RemoteStatus::Completed,
            "failed" | "error" => RemoteStatus::Failed,
            _ => RemoteStatus::InProgress(raw.to_string()),
        }
    }

    /// Returns true for `Completed`.
    pub fn is_completed(&self) -> bool {
        matches!(self, RemoteStatus::Completed)
    }

    /// Returns true for `Failed`.
    pub fn is_failed(&self) -> bool {
        matches!(self, RemoteStatus::Failed)
    }
}

/// A presigned upload link for one file, keyed by basename.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadTarget {
    /// File basename the link was issued for.
    pub filename: String,
    /// Presigned URL; empty when the service issued no usable link.
    pub url: String,
}

/// A presigned download link for one rendered output file.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    /// Output file basename.
    pub filename: String,
    /// Presigned URL.
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_status_parse() {
        assert_eq!(RemoteStatus::parse("completed"), RemoteStatus::Completed);
        assert_eq!(RemoteStatus::parse("Completed"), RemoteStatus::Completed);
        assert_eq!(RemoteStatus::parse("failed"), RemoteStatus::Failed);
        assert_eq!(
            RemoteStatus::parse("in_queue"),
            RemoteStatus::InProgress("in_queue".to_string())
        );
    }

    #[test]
    fn test_transient_classification() {
        assert!(EditorError::Timeout.is_transient());
        assert!(EditorError::Connection("refused".into()).is_transient());
        assert!(EditorError::api(500, "oops").is_transient());
        assert!(EditorError::api(503, "busy").is_transient());
        assert!(!EditorError::api(404, "no such project").is_transient());
        assert!(!EditorError::api(401, "bad key").is_transient());
        assert!(!EditorError::MalformedResponse("not json".into()).is_transient());
    }

    #[test]
    fn test_api_error_surfaces_status_and_body() {
        let err = EditorError::api(500, "internal server error");
        assert_eq!(err.to_string(), "HTTP 500: internal server error");
    }

    #[test]
    fn test_api_error_truncates_body() {
        let long = "x".repeat(500);
        if let EditorError::Api { body, .. } = EditorError::api(500, &long) {
            assert_eq!(body.len(), 200);
        } else {
            panic!("expected Api variant");
        }
    }
}
