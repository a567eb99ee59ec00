//! Structured job logging.
//!
//! Every event carries the job id and the run's operation name so a single
//! job can be followed through the stages in aggregated logs.

use reel_models::{Job, JobId, JobStatus};
use tracing::{error, info, warn, Span};

/// Logger bound to one job run.
#[derive(Debug, Clone)]
pub struct JobLogger {
    job_id: String,
    operation: &'static str,
}

impl JobLogger {
    pub fn new(job_id: &JobId, operation: &'static str) -> Self {
        Self {
            job_id: job_id.to_string(),
            operation,
        }
    }

    pub fn job_id(&self) -> &str {
        &self.job_id
    }

    pub fn operation(&self) -> &str {
        self.operation
    }

    /// Span wrapping the whole run.
    pub fn span(&self) -> Span {
        tracing::info_span!("job", job_id = %self.job_id, operation = self.operation)
    }

    pub fn started(&self, keywords: &[String]) {
        info!(
            job_id = %self.job_id,
            operation = self.operation,
            keywords = ?keywords,
            "Pipeline job started"
        );
    }

    pub fn stage(&self, stage: JobStatus) {
        info!(
            job_id = %self.job_id,
            operation = self.operation,
            stage = %stage,
            "Entering stage"
        );
    }

    /// Publishing skipped in favor of the stub result.
    pub fn stub_publish(&self, reason: &str) {
        warn!(
            job_id = %self.job_id,
            operation = self.operation,
            reason,
            "Publishing skipped, recording stub video"
        );
    }

    pub fn warning(&self, message: &str) {
        warn!(job_id = %self.job_id, operation = self.operation, "{}", message);
    }

    /// Log the terminal state of a job.
    pub fn finished(&self, job: &Job) {
        match job.status {
            JobStatus::Done => info!(
                job_id = %self.job_id,
                operation = self.operation,
                video_id = job.video_id.as_deref().unwrap_or_default(),
                published = job.published,
                "Pipeline job done"
            ),
            JobStatus::Cancelled => warn!(
                job_id = %self.job_id,
                operation = self.operation,
                "Pipeline job cancelled"
            ),
            status => error!(
                job_id = %self.job_id,
                operation = self.operation,
                status = %status,
                error = job.error.as_deref().unwrap_or_default(),
                "Pipeline job failed"
            ),
        }
    }
}
