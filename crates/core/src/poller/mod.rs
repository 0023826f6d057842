//! Job poller.
//!
//! Runs on a fixed schedule with no input beyond "now". Each run scans
//! every in-flight job, advances each one stage at a time against the
//! remote editing service, and materializes finished output. Jobs are
//! processed sequentially and failures are isolated per job: one bad job
//! can never stall or corrupt the processing of its siblings.

mod materialize;
mod runner;
mod types;

pub use runner::JobPoller;
pub use types::{PollReport, PollerConfig, PollerError, EDIT_FAILED_MESSAGE, EXPORT_FAILED_MESSAGE};
