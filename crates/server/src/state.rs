use std::sync::Arc;

use prometheus::Registry;

use darkroom_core::{Config, JobOrchestrator, JobPoller, JobStore, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    jobs: JobStore,
    orchestrator: Arc<JobOrchestrator>,
    poller: Arc<JobPoller>,
    registry: Registry,
}

impl AppState {
    pub fn new(
        config: Config,
        jobs: JobStore,
        orchestrator: Arc<JobOrchestrator>,
        poller: Arc<JobPoller>,
        registry: Registry,
    ) -> Self {
        Self {
            config,
            jobs,
            orchestrator,
            poller,
            registry,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn jobs(&self) -> &JobStore {
        &self.jobs
    }

    pub fn orchestrator(&self) -> Arc<JobOrchestrator> {
        Arc::clone(&self.orchestrator)
    }

    pub fn poller(&self) -> &JobPoller {
        &self.poller
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn scan_max_pages(&self) -> usize {
        self.config.pipeline.scan_max_pages
    }
}
