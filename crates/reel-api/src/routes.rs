//! API routes.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::health;
use crate::handlers::pipeline::{cancel_job, get_job, list_jobs, run_pipeline};
use crate::handlers::youtube::{auth_url, callback, disconnect, status};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, request_id, request_logging};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let pipeline_routes = Router::new()
        .route("/pipeline/run", post(run_pipeline))
        .route("/pipeline/jobs", get(list_jobs))
        .route("/pipeline/jobs/:job_id", get(get_job))
        .route("/pipeline/jobs/:job_id/cancel", post(cancel_job));

    let youtube_routes = Router::new()
        .route("/youtube/auth-url", get(auth_url))
        .route("/youtube/callback", get(callback))
        .route("/youtube/status", get(status))
        .route("/youtube/disconnect", post(disconnect));

    let api_routes = Router::new().merge(pipeline_routes).merge(youtube_routes);

    // Metrics endpoint (if enabled)
    let metrics_routes = match metrics_handle {
        Some(handle) => Router::new().route("/metrics", get(move || async move { handle.render() })),
        None => Router::new(),
    };

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health))
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
