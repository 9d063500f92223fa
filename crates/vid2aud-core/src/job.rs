//! Job and batch result model

use crate::error::{ErrorKind, Vid2AudError};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Lifecycle of a job. Variants are ordered; a job only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Downloading,
    Converting,
    Done,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Downloading => write!(f, "downloading"),
            JobStatus::Converting => write!(f, "converting"),
            JobStatus::Done => write!(f, "done"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// One URL's download-and-convert unit of work
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    source_url: String,
    output_path: Option<PathBuf>,
    title: Option<String>,
    status: JobStatus,
    error: Option<String>,
    error_kind: Option<ErrorKind>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            output_path: None,
            title: None,
            status: JobStatus::Pending,
            error: None,
            error_kind: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error_kind
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn is_done(&self) -> bool {
        self.status == JobStatus::Done
    }

    pub fn is_failed(&self) -> bool {
        self.status == JobStatus::Failed
    }

    pub(crate) fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    pub(crate) fn set_output_path(&mut self, path: PathBuf) {
        self.output_path = Some(path);
    }

    /// Move to a later non-failed status. Backward moves and moves out of a
    /// terminal status are ignored.
    pub(crate) fn advance(&mut self, next: JobStatus) {
        if next == JobStatus::Failed || self.status.is_terminal() || next <= self.status {
            warn!(
                "Ignoring job transition {} -> {} for {}",
                self.status, next, self.source_url
            );
            return;
        }

        self.status = next;
        if next.is_terminal() {
            self.finished_at = Some(Utc::now());
        }
    }

    /// Mark the job failed with the error's text. Ignored once terminal.
    pub(crate) fn fail(&mut self, err: &Vid2AudError) {
        if self.status.is_terminal() {
            warn!("Ignoring failure for finished job {}: {}", self.source_url, err);
            return;
        }

        self.status = JobStatus::Failed;
        self.error = Some(err.to_string());
        self.error_kind = Some(err.kind());
        self.finished_at = Some(Utc::now());
    }
}

/// Progress notification sent on every job status change
#[derive(Debug, Clone)]
pub struct JobEvent {
    pub url: String,
    pub status: JobStatus,
    pub title: Option<String>,
    pub output_path: Option<PathBuf>,
    pub error: Option<String>,
}

impl From<&Job> for JobEvent {
    fn from(job: &Job) -> Self {
        Self {
            url: job.source_url.clone(),
            status: job.status,
            title: job.title.clone(),
            output_path: job.output_path.clone(),
            error: job.error.clone(),
        }
    }
}

/// Jobs of one batch, in input order
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchResult {
    jobs: Vec<Job>,
}

impl BatchResult {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self { jobs }
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.jobs.iter().filter(|j| j.is_done()).count()
    }

    pub fn failed(&self) -> usize {
        self.jobs.iter().filter(|j| j.is_failed()).count()
    }

    /// True when every job finished successfully
    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }

    pub fn into_jobs(self) -> Vec<Job> {
        self.jobs
    }
}

/// Per-URL success/failure summary
impl std::fmt::Display for BatchResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Batch Complete ===")?;
        for (idx, job) in self.jobs.iter().enumerate() {
            match (job.status, job.output_path(), job.error()) {
                (JobStatus::Done, Some(path), _) => {
                    writeln!(f, "[{}] OK     {} -> {}", idx + 1, job.source_url, path.display())?
                }
                (_, _, Some(error)) => {
                    writeln!(f, "[{}] FAILED {} - {}", idx + 1, job.source_url, error)?
                }
                (status, _, _) => writeln!(f, "[{}] {} {}", idx + 1, status, job.source_url)?,
            }
        }
        writeln!(f)?;
        writeln!(f, "Succeeded: {}", self.succeeded())?;
        write!(f, "Failed: {}", self.failed())
    }
}
