//! Publisher metrics.

use metrics::counter;

/// Metric name constants for consistency.
pub mod names {
    /// Access-token refreshes by outcome.
    pub const TOKEN_REFRESH_TOTAL: &str = "reel_token_refresh_total";

    /// Upload attempts by outcome.
    pub const UPLOADS_TOTAL: &str = "reel_uploads_total";
}

/// Record an access-token refresh attempt.
pub fn record_token_refresh(outcome: &str) {
    counter!(
        names::TOKEN_REFRESH_TOTAL,
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record an upload attempt.
pub fn record_upload(outcome: &str) {
    counter!(
        names::UPLOADS_TOTAL,
        "outcome" => outcome.to_string()
    )
    .increment(1);
}
