//! API error types.

use std::sync::atomic::{AtomicBool, Ordering};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use reel_pipeline::PipelineError;
use reel_publisher::PublisherError;
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

static HIDE_INTERNAL_DETAILS: AtomicBool = AtomicBool::new(false);

/// Replace 500 response details with a generic message from now on.
/// Set once at startup for production deployments.
pub fn hide_internal_details(hide: bool) {
    HIDE_INTERNAL_DETAILS.store(hide, Ordering::Relaxed);
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Publisher error: {0}")]
    Publisher(#[from] PublisherError),
}

impl ApiError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Publisher(PublisherError::NotConfigured(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Publisher(PublisherError::NotConnected) => StatusCode::UNAUTHORIZED,
            ApiError::Pipeline(_) | ApiError::Publisher(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Response detail. Internal errors are masked when `hide_internal`.
    fn detail(&self, hide_internal: bool) -> String {
        if hide_internal && self.status_code() == StatusCode::INTERNAL_SERVER_ERROR {
            "An internal error occurred".to_string()
        } else {
            self.to_string()
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let detail = self.detail(HIDE_INTERNAL_DETAILS.load(Ordering::Relaxed));
        (status, Json(ErrorResponse { detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(PublisherError::NotConnected).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(PipelineError::NoTopics).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_hidden_when_requested() {
        let err = ApiError::from(PipelineError::NoTopics);
        assert_eq!(err.detail(true), "An internal error occurred");
        assert!(err.detail(false).starts_with("Pipeline error:"));

        let err = ApiError::bad_request("keywords must be a list");
        assert_eq!(err.detail(true), "Bad request: keywords must be a list");
    }
}
