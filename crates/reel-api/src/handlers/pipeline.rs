//! Pipeline job handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use reel_models::{Job, JobId};
use reel_pipeline::RunOptions;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Default page size for job listings.
pub const DEFAULT_LIST_LIMIT: usize = 20;

/// Maximum page size for job listings.
pub const MAX_LIST_LIMIT: usize = 100;

/// Request body for starting a run.
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(flatten)]
    pub options: RunOptions,
    /// Block until the job finishes instead of returning the pending job
    #[serde(default)]
    pub wait: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListJobsQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct JobsResponse {
    pub jobs: Vec<Job>,
}

#[derive(Serialize)]
pub struct CancelResponse {
    pub cancelled: bool,
}

/// Start a pipeline run.
///
/// Returns the finished job (200) when `wait` is set, otherwise the pending
/// job (202) while the run continues in the background.
pub async fn run_pipeline(
    State(state): State<AppState>,
    payload: Result<Json<RunRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Job>)> {
    let Json(request) = payload.map_err(|e| ApiError::bad_request(e.body_text()))?;
    info!(keywords = request.keywords.len(), wait = request.wait, "Pipeline run requested");

    if request.wait {
        let job = state.orchestrator.run(request.keywords, request.options).await;
        Ok((StatusCode::OK, Json(job)))
    } else {
        let job = state.orchestrator.submit(request.keywords, request.options).await;
        Ok((StatusCode::ACCEPTED, Json(job)))
    }
}

/// List recent jobs, most recently updated first.
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> ApiResult<Json<JobsResponse>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);
    let jobs = state.orchestrator.list_jobs(limit).await?;
    Ok(Json(JobsResponse { jobs }))
}

/// Fetch one job.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> ApiResult<Json<Job>> {
    let job_id = JobId::from_string(job_id);
    state
        .orchestrator
        .get_job(&job_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Job {} not found", job_id)))
}

/// Request cancellation of a running job.
pub async fn cancel_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Json<CancelResponse> {
    let cancelled = state.orchestrator.cancel(&JobId::from_string(job_id));
    Json(CancelResponse { cancelled })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_request_flattens_options() {
        let request: RunRequest = serde_json::from_str(
            r#"{"keywords":["rust"],"character_hint":"robot","enable_narration":false,"wait":true}"#,
        )
        .unwrap();
        assert_eq!(request.keywords, vec!["rust".to_string()]);
        assert_eq!(request.options.character_hint.as_deref(), Some("robot"));
        assert!(!request.options.enable_narration);
        assert!(request.wait);
    }

    #[test]
    fn test_run_request_defaults() {
        let request: RunRequest = serde_json::from_str(r#"{"keywords":["rust"]}"#).unwrap();
        assert!(request.options.enable_narration);
        assert!(!request.wait);
    }
}
