//! Job orchestrator.
//!
//! Invoked once per newly created processing job. Uploads the staged
//! originals to the remote editing service and starts the edit, then
//! returns; from that point on the poller owns the job. The orchestrator
//! never polls and never retries a failed batch — resuming one means
//! invoking it again, which creates a fresh remote project.

mod config;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::JobOrchestrator;
pub use types::{OrchestratorError, ProcessRequest};
