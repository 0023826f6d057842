//! darkroom-core: the RAW photo processing pipeline.
//!
//! Two cooperating components drive batches of camera RAW/JPEG files
//! through an external photo-editing service and materialize the finished
//! images back into the platform's own storage and gallery records:
//!
//! - [`orchestrator::JobOrchestrator`] — invoked once per new job; uploads
//!   the staged originals and starts the remote edit, then returns.
//! - [`poller::JobPoller`] — invoked on a schedule; scans all in-flight
//!   jobs, advances each one stage at a time, and materializes output when
//!   the remote export completes.
//!
//! Coordination happens entirely through the persisted job record
//! ([`job::ProcessingJob`]); neither component holds state between
//! invocations.

pub mod blob;
pub mod config;
pub mod editor;
pub mod gallery;
pub mod job;
pub mod metrics;
pub mod orchestrator;
pub mod poller;
pub mod store;
pub mod testing;

pub use blob::{BlobError, BlobStore, FsBlobStore};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use editor::{EditorError, ImagenEditor, PhotoEditor, RemoteStatus, RetryPolicy};
pub use gallery::{Gallery, GalleryImage, GalleryStore};
pub use job::{JobPatch, JobSource, JobStatus, JobStore, ProcessingJob};
pub use orchestrator::{JobOrchestrator, OrchestratorConfig, OrchestratorError, ProcessRequest};
pub use poller::{JobPoller, PollReport, PollerConfig};
pub use store::{DocumentStore, Patch, SqliteDocumentStore};
