//! Pipeline metrics.
//!
//! Provides counters for job outcomes and provider fallbacks, and a
//! histogram of stage latency.

use std::time::Duration;

use metrics::{counter, histogram};
use reel_models::JobStatus;

/// Metric name constants for consistency.
pub mod names {
    /// Finished jobs by terminal status.
    pub const JOBS_TOTAL: &str = "reel_jobs_total";

    /// Stage latency in seconds by stage.
    pub const STAGE_DURATION_SECONDS: &str = "reel_stage_duration_seconds";

    /// Provider failures converted to fallback values, by component.
    pub const PROVIDER_FALLBACKS_TOTAL: &str = "reel_provider_fallbacks_total";
}

/// Record a job reaching a terminal status.
pub fn record_job(status: JobStatus) {
    counter!(names::JOBS_TOTAL, "status" => status.as_str()).increment(1);
}

/// Record how long a stage took.
pub fn record_stage_duration(stage: JobStatus, elapsed: Duration) {
    histogram!(names::STAGE_DURATION_SECONDS, "stage" => stage.as_str())
        .record(elapsed.as_secs_f64());
}

/// Record a provider failure that was degraded to a fallback.
pub fn record_fallback(component: &'static str) {
    counter!(names::PROVIDER_FALLBACKS_TOTAL, "component" => component).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_names() {
        assert!(names::JOBS_TOTAL.starts_with("reel_"));
        assert!(names::STAGE_DURATION_SECONDS.ends_with("_seconds"));
        assert!(names::PROVIDER_FALLBACKS_TOTAL.contains("fallbacks"));
    }
}
