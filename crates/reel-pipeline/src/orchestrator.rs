//! Pipeline job orchestration.
//!
//! Drives one job through `collecting -> script -> images -> video ->
//! upload -> done`, persisting the job before each stage so pollers observe
//! progress. Provider failures inside a stage degrade to fallbacks; any other
//! stage error fails the job with its message.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use reel_models::{Job, JobId, JobStatus, Script, TrendTopic, VideoArtifact};
use reel_publisher::{AccountConnector, UploadMeta, DEFAULT_CONNECTOR_KEY};
use serde::Deserialize;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, Instrument};

use crate::assembler::{PlaceholderAssembler, VideoAssembler};
use crate::collector::TopicCollector;
use crate::composer::compose;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::logging::JobLogger;
use crate::metrics::{record_job, record_stage_duration};
use crate::narration::NarrationSynthesizer;
use crate::providers::{ImageProvider, ProviderConfig, SearchProvider, TtsProvider};
use crate::renderer::SceneRenderer;
use crate::store::{InMemoryJobStore, JobStore};

/// Video id reported when publishing is skipped.
pub const STUB_VIDEO_ID: &str = "stub-video-id";

/// Video URL reported when publishing is skipped.
pub const STUB_VIDEO_URL: &str = "https://www.youtube.com/watch?v=stub-video-id";

/// Per-run options.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    pub character_hint: Option<String>,
    /// Publishing account; `"default"` when unset
    pub connector_key: Option<String>,
    pub enable_narration: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            character_hint: None,
            connector_key: None,
            enable_narration: true,
        }
    }
}

impl RunOptions {
    fn connector_key(&self) -> &str {
        self.connector_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .unwrap_or(DEFAULT_CONNECTOR_KEY)
    }
}

/// Outcome of the upload stage.
struct Publication {
    video_id: String,
    url: String,
    published: bool,
}

impl Publication {
    fn stub() -> Self {
        Self {
            video_id: STUB_VIDEO_ID.to_string(),
            url: STUB_VIDEO_URL.to_string(),
            published: false,
        }
    }
}

/// Race `fut` against cancellation of the job.
async fn cancellable<F: Future>(cancel: &CancellationToken, fut: F) -> PipelineResult<F::Output> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PipelineError::Cancelled),
        output = fut => Ok(output),
    }
}

fn upload_description(script: &Script, topic: &TrendTopic) -> String {
    let mut parts = vec![script.hook.clone()];
    if !topic.summary.trim().is_empty() {
        parts.push(topic.summary.trim().to_string());
    }
    parts.push("#shorts".to_string());
    parts.join("\n\n")
}

/// Runs pipeline jobs and tracks the ones in flight.
pub struct JobOrchestrator {
    config: PipelineConfig,
    collector: TopicCollector,
    renderer: SceneRenderer,
    narrator: NarrationSynthesizer,
    assembler: Arc<dyn VideoAssembler>,
    connector: Option<Arc<AccountConnector>>,
    store: Arc<dyn JobStore>,
    running: DashMap<JobId, CancellationToken>,
}

impl JobOrchestrator {
    /// Orchestrator with no providers, the placeholder assembler and no
    /// publishing account.
    pub fn new(config: PipelineConfig, store: Arc<dyn JobStore>) -> Self {
        let timeout = config.provider_timeout;
        let tts_language = ProviderConfig::default().tts_language;

        Self {
            collector: TopicCollector::new(timeout),
            renderer: SceneRenderer::new(timeout),
            narrator: NarrationSynthesizer::new(tts_language, timeout),
            assembler: Arc::new(PlaceholderAssembler::new(config.work_dir.clone())),
            connector: None,
            store,
            running: DashMap::new(),
            config,
        }
    }

    /// Orchestrator configured from environment variables, with an
    /// in-memory job store and whichever providers have API keys.
    pub fn from_env() -> PipelineResult<Self> {
        let config = PipelineConfig::from_env();
        let providers = ProviderConfig::from_env();
        Self::new(config, Arc::new(InMemoryJobStore::new())).with_providers(&providers)
    }

    /// Install every provider `providers` has credentials for.
    pub fn with_providers(mut self, providers: &ProviderConfig) -> PipelineResult<Self> {
        let build_error = |e: crate::providers::ProviderError| {
            PipelineError::config_error(format!("provider setup: {}", e))
        };

        self.collector
            .set_provider(providers.search_provider().map_err(build_error)?);
        self.renderer
            .set_provider(providers.image_provider().map_err(build_error)?);
        self.narrator = NarrationSynthesizer::new(
            providers.tts_language.clone(),
            self.config.provider_timeout,
        );
        self.narrator
            .set_provider(providers.tts_provider().map_err(build_error)?);

        Ok(self)
    }

    pub fn with_search_provider(mut self, provider: Arc<dyn SearchProvider>) -> Self {
        self.collector.set_provider(Some(provider));
        self
    }

    pub fn with_image_provider(mut self, provider: Arc<dyn ImageProvider>) -> Self {
        self.renderer.set_provider(Some(provider));
        self
    }

    pub fn with_tts_provider(mut self, provider: Arc<dyn TtsProvider>) -> Self {
        self.narrator.set_provider(Some(provider));
        self
    }

    pub fn with_assembler(mut self, assembler: Arc<dyn VideoAssembler>) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn with_connector(mut self, connector: Arc<AccountConnector>) -> Self {
        self.connector = Some(connector);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run a job to completion. Always returns the final job record.
    ///
    /// The job runs on its own task, so dropping this future does not stop
    /// it or leave it unfinished in the store.
    pub async fn run(self: &Arc<Self>, keywords: Vec<String>, options: RunOptions) -> Job {
        let (pending, handle) = self.start(keywords, options).await;

        match handle.await {
            Ok(job) => job,
            Err(e) => {
                let mut job = pending;
                job.fail(format!("Job task aborted: {}", e));
                self.running.remove(&job.job_id);
                if let Err(e) = self.store.put(job.clone()).await {
                    JobLogger::new(&job.job_id, "pipeline")
                        .warning(&format!("Failed to persist aborted job: {}", e));
                }
                record_job(job.status);
                job
            }
        }
    }

    /// Start a job in the background and return its pending snapshot.
    pub async fn submit(self: &Arc<Self>, keywords: Vec<String>, options: RunOptions) -> Job {
        let (pending, _handle) = self.start(keywords, options).await;
        pending
    }

    /// Create and persist a pending job, then spawn its execution.
    async fn start(
        self: &Arc<Self>,
        keywords: Vec<String>,
        options: RunOptions,
    ) -> (Job, JoinHandle<Job>) {
        let job = Job::new();
        let cancel = self.register(&job.job_id);

        if let Err(e) = self.store.put(job.clone()).await {
            JobLogger::new(&job.job_id, "pipeline")
                .warning(&format!("Failed to persist pending job: {}", e));
        }

        let this = Arc::clone(self);
        let pending = job.clone();
        let handle = tokio::spawn(async move { this.execute(job, keywords, options, cancel).await });

        (pending, handle)
    }

    /// Request cancellation of an in-flight job. Returns false when the job
    /// is unknown or already finished.
    pub fn cancel(&self, job_id: &JobId) -> bool {
        match self.running.get(job_id) {
            Some(token) => {
                token.cancel();
                info!(job_id = %job_id, "Cancellation requested");
                true
            }
            None => false,
        }
    }

    /// Whether the job is still running.
    pub fn is_running(&self, job_id: &JobId) -> bool {
        self.running.contains_key(job_id)
    }

    pub async fn get_job(&self, job_id: &JobId) -> PipelineResult<Option<Job>> {
        self.store.get(job_id).await
    }

    /// Most recently updated jobs first.
    pub async fn list_jobs(&self, limit: usize) -> PipelineResult<Vec<Job>> {
        self.store.list(limit).await
    }

    fn register(&self, job_id: &JobId) -> CancellationToken {
        let token = CancellationToken::new();
        self.running.insert(job_id.clone(), token.clone());
        token
    }

    async fn execute(
        &self,
        mut job: Job,
        keywords: Vec<String>,
        options: RunOptions,
        cancel: CancellationToken,
    ) -> Job {
        let logger = JobLogger::new(&job.job_id, "pipeline");
        let span = logger.span();

        async {
            logger.started(&keywords);

            let outcome = self
                .run_stages(&mut job, &keywords, &options, &cancel, &logger)
                .await;

            // Cancellation is acknowledged only while the job is registered.
            self.running.remove(&job.job_id);
            let outcome = match outcome {
                Ok(_) if cancel.is_cancelled() => Err(PipelineError::Cancelled),
                other => other,
            };

            match outcome {
                Ok(publication) => {
                    let from = job.status;
                    if !job.complete(publication.video_id, publication.url, publication.published) {
                        job.fail(
                            PipelineError::InvalidTransition {
                                from,
                                to: JobStatus::Done,
                            }
                            .to_string(),
                        );
                    }
                }
                Err(e) if e.is_cancelled() => {
                    job.cancel();
                }
                Err(e) => {
                    job.fail(e.to_string());
                }
            }
            logger.finished(&job);

            if let Err(e) = self.store.put(job.clone()).await {
                logger.warning(&format!("Failed to persist final job state: {}", e));
            }
            record_job(job.status);
        }
        .instrument(span)
        .await;

        job
    }

    /// Set the job's status, persist it and check for cancellation.
    async fn enter(
        &self,
        job: &mut Job,
        stage: JobStatus,
        cancel: &CancellationToken,
        logger: &JobLogger,
    ) -> PipelineResult<()> {
        if cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let from = job.status;
        if !job.set_status(stage) {
            return Err(PipelineError::InvalidTransition { from, to: stage });
        }
        logger.stage(stage);
        self.store.put(job.clone()).await
    }

    async fn run_stages(
        &self,
        job: &mut Job,
        keywords: &[String],
        options: &RunOptions,
        cancel: &CancellationToken,
        logger: &JobLogger,
    ) -> PipelineResult<Publication> {
        let character = options
            .character_hint
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(self.config.default_character.as_str());

        // Collecting
        self.enter(job, JobStatus::Collecting, cancel, logger).await?;
        let started = Instant::now();
        let topics = cancellable(
            cancel,
            self.collector.collect(keywords, self.config.max_per_keyword),
        )
        .await?;
        let topic = topics.into_iter().next().ok_or(PipelineError::NoTopics)?;
        job.topic = Some(topic.clone());
        record_stage_duration(JobStatus::Collecting, started.elapsed());

        // Script
        self.enter(job, JobStatus::Script, cancel, logger).await?;
        let script = compose(&topic, Some(character));
        script.validate()?;
        job.script = Some(script.clone());

        // Images, with narration in the same window
        self.enter(job, JobStatus::Images, cancel, logger).await?;
        let started = Instant::now();
        job.images = cancellable(cancel, self.renderer.render(&script, Some(character))).await?;
        if options.enable_narration {
            job.narration = cancellable(cancel, self.narrator.synthesize(&script.scenes)).await?;
        }
        record_stage_duration(JobStatus::Images, started.elapsed());

        // Video
        self.enter(job, JobStatus::Video, cancel, logger).await?;
        let started = Instant::now();
        let artifact = cancellable(
            cancel,
            self.assembler.assemble(&script, &job.images, &job.narration),
        )
        .await??;
        if artifact.duration_seconds != script.total_duration_seconds {
            return Err(PipelineError::assembly(format!(
                "{} assembler reported {}s for a {}s script",
                self.assembler.name(),
                artifact.duration_seconds,
                script.total_duration_seconds
            )));
        }
        job.video = Some(artifact.clone());
        record_stage_duration(JobStatus::Video, started.elapsed());

        // Upload
        self.enter(job, JobStatus::Upload, cancel, logger).await?;
        let started = Instant::now();
        let publication = cancellable(
            cancel,
            self.publish(&topic, &script, &artifact, options, logger),
        )
        .await??;
        record_stage_duration(JobStatus::Upload, started.elapsed());

        Ok(publication)
    }

    async fn publish(
        &self,
        topic: &TrendTopic,
        script: &Script,
        artifact: &VideoArtifact,
        options: &RunOptions,
        logger: &JobLogger,
    ) -> PipelineResult<Publication> {
        let Some(connector) = &self.connector else {
            logger.stub_publish("no publishing account configured");
            return Ok(Publication::stub());
        };

        let meta = UploadMeta::new(script.topic_title.clone(), upload_description(script, topic));
        let key = options.connector_key();

        match connector.upload_video(&artifact.video_path, &meta, key).await {
            Ok(video) => Ok(Publication {
                video_id: video.video_id,
                url: video.url,
                published: true,
            }),
            Err(e) if e.is_not_connected() => {
                logger.stub_publish(&format!("account '{}' not connected", key));
                Ok(Publication::stub())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_options_defaults() {
        let options: RunOptions = serde_json::from_str("{}").unwrap();
        assert!(options.enable_narration);
        assert_eq!(options.connector_key(), DEFAULT_CONNECTOR_KEY);

        let options: RunOptions =
            serde_json::from_str(r#"{"connector_key":"acct","enable_narration":false}"#).unwrap();
        assert!(!options.enable_narration);
        assert_eq!(options.connector_key(), "acct");
    }

    #[test]
    fn test_upload_description() {
        let topic = TrendTopic::manual("rust", "Rust news", "Big release", 50.0);
        let script = compose(&topic, None);
        assert_eq!(
            upload_description(&script, &topic),
            "Rust news\n\nBig release\n\n#shorts"
        );
    }
}
