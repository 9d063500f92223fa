//! Job runner: download, verify, convert and clean up for a single URL

use crate::config::RunnerConfig;
use crate::downloader::{Downloader, YtDlp};
use crate::error::{DownloadError, Result, Vid2AudError};
use crate::job::{Job, JobEvent, JobStatus};
use crate::naming::{output_stem, unique_output_path};
use crate::transcoder::{Ffmpeg, TrackTags, Transcoder};

use std::path::{Path, PathBuf};
use std::time::Instant;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub struct JobRunner {
    downloader: Box<dyn Downloader>,
    transcoder: Box<dyn Transcoder>,
    temp_root: PathBuf,
    verify: bool,
    progress_tx: Option<mpsc::Sender<JobEvent>>,
}

impl JobRunner {
    pub fn new(
        downloader: Box<dyn Downloader>,
        transcoder: Box<dyn Transcoder>,
        temp_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            downloader,
            transcoder,
            temp_root: temp_root.into(),
            verify: false,
            progress_tx: None,
        }
    }

    /// Runner backed by the real yt-dlp and FFmpeg binaries
    pub fn from_config(config: &RunnerConfig) -> Self {
        let downloader = YtDlp::new(config.yt_dlp.clone(), config.download.format.clone());
        let transcoder = Ffmpeg::new(config.ffmpeg.clone(), config.audio.clone());
        Self::new(Box::new(downloader), Box::new(transcoder), config.temp_root.clone())
            .with_verify(config.download.verify)
    }

    /// Decode each download once before converting it
    pub fn with_verify(mut self, verify: bool) -> Self {
        self.verify = verify;
        self
    }

    /// Send a [`JobEvent`] on every status change
    pub fn with_progress(mut self, tx: mpsc::Sender<JobEvent>) -> Self {
        self.progress_tx = Some(tx);
        self
    }

    pub(crate) async fn notify(&self, job: &Job) {
        if let Some(ref tx) = self.progress_tx {
            if tx.send(JobEvent::from(job)).await.is_err() {
                debug!("Progress receiver closed; dropping event for {}", job.source_url());
            }
        }
    }

    /// Run one URL to completion. Never returns an error: failures are
    /// recorded on the returned job.
    pub async fn run(&self, url: &str, output_dir: &Path) -> Job {
        let start_time = Instant::now();
        let mut job = Job::new(url);
        self.notify(&job).await;

        match self.execute(&mut job, output_dir).await {
            Ok(()) => {
                job.advance(JobStatus::Done);
                info!(
                    "Done: {} ({:.1}s)",
                    job.output_path().map(|p| p.display().to_string()).unwrap_or_default(),
                    start_time.elapsed().as_secs_f32()
                );
            }
            Err(e) => {
                warn!("Job failed for {}: {}", url, e);
                job.fail(&e);
            }
        }

        self.notify(&job).await;
        job
    }

    async fn execute(&self, job: &mut Job, output_dir: &Path) -> Result<()> {
        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|source| Vid2AudError::Prepare {
                path: output_dir.to_path_buf(),
                source,
            })?;

        let scratch = self.scratch_dir()?;
        debug!("Temp directory: {}", scratch.path().display());

        let result = self.download_and_convert(job, output_dir, scratch.path()).await;

        // Removed on every path so no intermediate file outlives the job
        let scratch_path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            warn!("Failed to remove temp directory {}: {}", scratch_path.display(), e);
        }

        result
    }

    fn scratch_dir(&self) -> Result<TempDir> {
        std::fs::create_dir_all(&self.temp_root)
            .and_then(|_| {
                tempfile::Builder::new()
                    .prefix("vid2aud-")
                    .tempdir_in(&self.temp_root)
            })
            .map_err(|source| Vid2AudError::Prepare {
                path: self.temp_root.clone(),
                source,
            })
    }

    async fn download_and_convert(&self, job: &mut Job, output_dir: &Path, scratch: &Path) -> Result<()> {
        let url = job.source_url().to_string();

        // 1. Download
        job.advance(JobStatus::Downloading);
        self.notify(job).await;

        let downloaded = self.downloader.fetch_audio(&url, scratch).await?;

        if self.verify {
            debug!("Validating downloaded audio");
            self.transcoder
                .verify(&downloaded.audio_path)
                .await
                .map_err(|e| DownloadError::Corrupt(e.to_string()))?;
        }

        let metadata = downloaded.metadata.as_ref();
        job.set_title(metadata.map(|m| m.title.clone()));

        let stem = output_stem(
            metadata.map(|m| m.title.as_str()),
            metadata.map(|m| m.id.as_str()),
        );
        let output_path = unique_output_path(output_dir, &stem);
        job.set_output_path(output_path.clone());

        // 2. Convert
        job.advance(JobStatus::Converting);
        self.notify(job).await;

        let tags = TrackTags {
            title: metadata.map(|m| m.title.clone()),
            artist: metadata.and_then(|m| m.artist_tag()).map(String::from),
            comment: metadata.map(|m| format!("YouTube: {}", m.id)),
        };

        self.transcoder
            .to_mp3(&downloaded.audio_path, &output_path, &tags)
            .await?;

        Ok(())
    }
}
