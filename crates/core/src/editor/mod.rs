//! Remote photo-editing service client.
//!
//! The pipeline drives a multi-phase workflow on an external editing
//! service: create a project, upload originals through presigned links,
//! start an edit with a profile, poll edit status, start an export, poll
//! export status, and finally download the rendered output. The service's
//! response envelopes are inconsistently nested; all of that ambiguity is
//! confined to [`envelope`].

mod envelope;
mod imagen;
mod retry;
mod traits;
mod types;

pub use envelope::{decode_envelope, decode_project_id};
pub use imagen::ImagenEditor;
pub use retry::{with_retries, RetryPolicy};
pub use traits::PhotoEditor;
pub use types::{EditorError, ExportFile, RemoteStatus, UploadTarget};
