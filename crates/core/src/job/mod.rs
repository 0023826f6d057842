//! Processing-job records.
//!
//! A job is one batch of staged source photos moving through the pipeline
//! as a unit. State lives on a single record that is overwritten in place;
//! the current status plus the remote project id is enough to resume after
//! a restart of either pipeline component.

mod store;
mod types;

pub use store::{JobPatch, JobStore, JobStoreError, JOBS_TABLE};
pub use types::{JobSource, JobStatus, ProcessingJob};
