//! Job record storage.

use std::collections::HashMap;

use async_trait::async_trait;
use reel_models::{Job, JobId};
use tokio::sync::RwLock;

use crate::error::{PipelineError, PipelineResult};

/// Storage for job records.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn get(&self, job_id: &JobId) -> PipelineResult<Option<Job>>;

    /// Insert or replace a job. A stored terminal job is never replaced.
    async fn put(&self, job: Job) -> PipelineResult<()>;

    /// Most recently updated jobs first, at most `limit`.
    async fn list(&self, limit: usize) -> PipelineResult<Vec<Job>>;

    async fn delete(&self, job_id: &JobId) -> PipelineResult<bool>;
}

/// Process-local job store.
#[derive(Debug, Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<HashMap<JobId, Job>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn get(&self, job_id: &JobId) -> PipelineResult<Option<Job>> {
        Ok(self.jobs.read().await.get(job_id).cloned())
    }

    async fn put(&self, job: Job) -> PipelineResult<()> {
        let mut jobs = self.jobs.write().await;
        if let Some(existing) = jobs.get(&job.job_id) {
            if existing.is_terminal() {
                return Err(PipelineError::JobTerminal(job.job_id));
            }
        }
        jobs.insert(job.job_id.clone(), job);
        Ok(())
    }

    async fn list(&self, limit: usize) -> PipelineResult<Vec<Job>> {
        let mut jobs: Vec<Job> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        jobs.truncate(limit);
        Ok(jobs)
    }

    async fn delete(&self, job_id: &JobId) -> PipelineResult<bool> {
        Ok(self.jobs.write().await.remove(job_id).is_some())
    }
}
