//! Pipeline job record and state machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::{SceneAudio, SceneImage, Script, TrendTopic, VideoArtifact};

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pipeline stage / lifecycle state of a job.
///
/// Stages advance linearly:
/// `pending -> collecting -> script -> images -> video -> upload -> done`.
/// `failed` and `cancelled` are reachable from any non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Created, no stage started yet
    #[default]
    Pending,
    /// Collecting trend topics
    Collecting,
    /// Composing the script
    Script,
    /// Rendering scene images (and narration)
    Images,
    /// Assembling the video
    Video,
    /// Publishing to the connected account
    Upload,
    /// Pipeline completed
    Done,
    /// A mandatory stage failed
    Failed,
    /// Cancelled by the caller
    Cancelled,
}

impl JobStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Collecting => "collecting",
            JobStatus::Script => "script",
            JobStatus::Images => "images",
            JobStatus::Video => "video",
            JobStatus::Upload => "upload",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    /// Check if this is a terminal state (no more updates expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed | JobStatus::Cancelled)
    }

    /// The stage that follows this one on the happy path.
    pub fn next(&self) -> Option<JobStatus> {
        match self {
            JobStatus::Pending => Some(JobStatus::Collecting),
            JobStatus::Collecting => Some(JobStatus::Script),
            JobStatus::Script => Some(JobStatus::Images),
            JobStatus::Images => Some(JobStatus::Video),
            JobStatus::Video => Some(JobStatus::Upload),
            JobStatus::Upload => Some(JobStatus::Done),
            JobStatus::Done | JobStatus::Failed | JobStatus::Cancelled => None,
        }
    }

    /// Whether moving from `self` to `to` is allowed.
    pub fn can_transition_to(&self, to: JobStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match to {
            JobStatus::Failed | JobStatus::Cancelled => true,
            other => self.next() == Some(other),
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One pipeline run and everything it produced so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: JobId,

    #[serde(default)]
    pub status: JobStatus,

    /// Selected topic (first collected)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<TrendTopic>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub script: Option<Script>,

    #[serde(default)]
    pub images: Vec<SceneImage>,

    #[serde(default)]
    pub narration: Vec<SceneAudio>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<VideoArtifact>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,

    /// False when the upload was substituted by a stub (no connected account)
    #[serde(default)]
    pub published: bool,

    /// Error message (if failed or cancelled)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a new pending job.
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            job_id: JobId::new(),
            status: JobStatus::Pending,
            topic: None,
            script: None,
            images: Vec::new(),
            narration: Vec::new(),
            video: None,
            video_id: None,
            video_url: None,
            published: false,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the job is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Move to `status`, bumping `updated_at`. Returns false (and leaves the
    /// job untouched) if the transition is not allowed.
    pub fn set_status(&mut self, status: JobStatus) -> bool {
        if !self.status.can_transition_to(status) {
            return false;
        }
        self.status = status;
        self.updated_at = Utc::now();
        true
    }

    /// Mark the job done with its publish result.
    pub fn complete(&mut self, video_id: impl Into<String>, video_url: impl Into<String>, published: bool) -> bool {
        if !self.status.can_transition_to(JobStatus::Done) {
            return false;
        }
        self.video_id = Some(video_id.into());
        self.video_url = Some(video_url.into());
        self.published = published;
        self.set_status(JobStatus::Done)
    }

    /// Mark job as failed with an error message.
    pub fn fail(&mut self, error: impl Into<String>) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.error = Some(error.into());
        self.set_status(JobStatus::Failed)
    }

    /// Mark job as cancelled.
    pub fn cancel(&mut self) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.error = Some("Job cancelled".into());
        self.set_status(JobStatus::Cancelled)
    }
}

impl Default for Job {
    fn default() -> Self {
        Self::new()
    }
}
