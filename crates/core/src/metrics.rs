//! Prometheus metrics for the processing pipeline.

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};

/// Job status transitions by resulting status.
pub static JOB_TRANSITIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "darkroom_job_transitions_total",
            "Job status transitions by resulting status",
        ),
        &["status"],
    )
    .unwrap()
});

/// Poll runs completed.
pub static POLL_RUNS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(Opts::new(
        "darkroom_poll_runs_total",
        "Completed poller runs",
    ))
    .unwrap()
});

/// Jobs failed and recorded during a poll run.
pub static POLL_JOB_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(Opts::new(
        "darkroom_poll_job_failures_total",
        "Jobs marked failed during poll runs",
    ))
    .unwrap()
});

/// Staged files uploaded to the editing service.
pub static FILES_UPLOADED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(Opts::new(
        "darkroom_files_uploaded_total",
        "Staged files uploaded to the editing service",
    ))
    .unwrap()
});

/// Rendered output files stored.
pub static FILES_MATERIALIZED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(Opts::new(
        "darkroom_files_materialized_total",
        "Rendered output files stored",
    ))
    .unwrap()
});

/// Duration of one poll run in seconds.
pub static POLL_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("darkroom_poll_duration_seconds", "Duration of one poll run")
            .buckets(vec![0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0]),
    )
    .unwrap()
});

/// Register all pipeline metrics into the given registry.
pub fn register_all(registry: &Registry) -> Result<(), prometheus::Error> {
    registry.register(Box::new(JOB_TRANSITIONS.clone()))?;
    registry.register(Box::new(POLL_RUNS.clone()))?;
    registry.register(Box::new(POLL_JOB_FAILURES.clone()))?;
    registry.register(Box::new(FILES_UPLOADED.clone()))?;
    registry.register(Box::new(FILES_MATERIALIZED.clone()))?;
    registry.register(Box::new(POLL_DURATION.clone()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all() {
        let registry = Registry::new();
        register_all(&registry).unwrap();

        JOB_TRANSITIONS.with_label_values(&["failed"]).inc();
        let families = registry.gather();
        assert!(families
            .iter()
            .any(|f| f.get_name() == "darkroom_job_transitions_total"));
    }
}
