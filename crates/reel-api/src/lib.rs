//! Axum HTTP API server.
//!
//! This crate provides:
//! - Pipeline routes: run, list, inspect and cancel jobs
//! - Account routes: OAuth authorization, callback, status and disconnect
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
