use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::error;

use darkroom_core::{JobSource, JobStatus, ProcessRequest, ProcessingJob};

use crate::state::AppState;

/// Body for creating a job record.
#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    #[serde(default)]
    pub gallery_id: Option<String>,
    pub raw_keys: Vec<String>,
}

/// Optional overrides for triggering orchestration.
#[derive(Debug, Default, Deserialize)]
pub struct ProcessOverrides {
    #[serde(default)]
    pub source: Option<JobSource>,
    #[serde(default)]
    pub profile_id: Option<String>,
}

/// Query params for listing jobs.
#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    #[serde(default)]
    pub status: Option<String>,
}

fn error_body(message: impl Into<String>) -> Json<serde_json::Value> {
    Json(json!({ "error": message.into() }))
}

/// POST /jobs — create a queued job record for staged files.
pub async fn create_job(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateJobRequest>,
) -> impl IntoResponse {
    if request.raw_keys.is_empty() {
        return (StatusCode::BAD_REQUEST, error_body("raw_keys must not be empty"))
            .into_response();
    }

    let job_id = uuid::Uuid::new_v4().to_string();
    let job = ProcessingJob::new(job_id, request.gallery_id, request.raw_keys);

    match state.jobs().create(&job) {
        Ok(()) => (StatusCode::CREATED, Json(job)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to create job record");
            (StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string())).into_response()
        }
    }
}

/// GET /jobs — list jobs, optionally filtered by status.
pub async fn list_jobs(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListJobsQuery>,
) -> impl IntoResponse {
    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => match JobStatus::parse(raw) {
            Some(status) => Some(status),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    error_body(format!("unknown status: {}", raw)),
                )
                    .into_response();
            }
        },
    };

    match state.jobs().list(status, state.scan_max_pages()) {
        Ok(jobs) => Json(jobs).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to list jobs");
            (StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string())).into_response()
        }
    }
}

/// GET /jobs/{id} — fetch one job record.
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    match state.jobs().get(&job_id) {
        Ok(Some(job)) => Json(job).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, error_body("job not found")).into_response(),
        Err(e) => {
            error!(job_id = %job_id, error = %e, "Failed to fetch job");
            (StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string())).into_response()
        }
    }
}

/// POST /jobs/{id}/process — trigger orchestration for a job.
///
/// Returns 202 immediately; the outcome is read back from the job record.
pub async fn process_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
    overrides: Option<Json<ProcessOverrides>>,
) -> impl IntoResponse {
    let job = match state.jobs().get(&job_id) {
        Ok(Some(job)) => job,
        Ok(None) => {
            return (StatusCode::NOT_FOUND, error_body("job not found")).into_response();
        }
        Err(e) => {
            error!(job_id = %job_id, error = %e, "Failed to fetch job");
            return (StatusCode::INTERNAL_SERVER_ERROR, error_body(e.to_string()))
                .into_response();
        }
    };

    if job.status.is_terminal() || job.status.is_pollable() {
        return (
            StatusCode::CONFLICT,
            error_body(format!("job is {}, not processable", job.status)),
        )
            .into_response();
    }

    let overrides = overrides.map(|Json(o)| o).unwrap_or_default();
    let request = ProcessRequest {
        job_id: job.job_id.clone(),
        gallery_id: job.gallery_id.clone(),
        raw_keys: job.raw_keys.clone(),
        source: overrides.source.or(job.source),
        profile_id: overrides.profile_id,
    };

    let orchestrator = state.orchestrator();
    tokio::spawn(async move {
        // Failures are already recorded on the job record.
        let _ = orchestrator.run(request).await;
    });

    (
        StatusCode::ACCEPTED,
        Json(json!({ "job_id": job_id, "status": "accepted" })),
    )
        .into_response()
}

/// POST /poll — run one poll pass on demand.
pub async fn run_poll(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.poller().run_once().await)
}
