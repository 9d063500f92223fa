//! Simulated yt-dlp and FFmpeg for runner and controller tests
//!
//! Behaviour is keyed off the last URL path segment (the "slug"):
//! - `fail-download*` makes the downloader exit non-zero
//! - `corrupt*` produces a download that fails verification
//! - `fail-convert*` makes the transcoder exit non-zero
//!
//! Anything else succeeds, with the title `Title <slug>`.

use crate::downloader::{DownloadedAudio, Downloader, VideoMetadata};
use crate::error::{DownloadError, TranscodeError};
use crate::transcoder::{TrackTags, Transcoder};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Shared record of every simulated tool invocation
#[derive(Debug, Clone, Default)]
pub(crate) struct ToolLog {
    inner: Arc<Mutex<LogInner>>,
}

#[derive(Debug, Default)]
struct LogInner {
    downloads: Vec<String>,
    downloaded_files: Vec<PathBuf>,
    verifications: usize,
    conversions: usize,
}

impl ToolLog {
    pub(crate) fn downloads(&self) -> Vec<String> {
        self.inner.lock().unwrap().downloads.clone()
    }

    pub(crate) fn downloaded_files(&self) -> Vec<PathBuf> {
        self.inner.lock().unwrap().downloaded_files.clone()
    }

    pub(crate) fn verifications(&self) -> usize {
        self.inner.lock().unwrap().verifications
    }

    pub(crate) fn conversions(&self) -> usize {
        self.inner.lock().unwrap().conversions
    }

    /// Total number of external tool calls of any kind
    pub(crate) fn invocations(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.downloads.len() + inner.verifications + inner.conversions
    }
}

fn slug(url: &str) -> String {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub(crate) struct FakeDownloader {
    log: ToolLog,
}

impl FakeDownloader {
    pub(crate) fn new(log: ToolLog) -> Self {
        Self { log }
    }
}

#[async_trait]
impl Downloader for FakeDownloader {
    async fn fetch_audio(&self, url: &str, dest_dir: &Path) -> Result<DownloadedAudio, DownloadError> {
        self.log.inner.lock().unwrap().downloads.push(url.to_string());

        let slug = slug(url);
        if slug.starts_with("fail-download") {
            return Err(DownloadError::YtDlpFailed {
                code: Some(1),
                stderr: "ERROR: simulated download error".to_string(),
            });
        }

        let audio_path = dest_dir.join(format!("{}.webm", slug));
        tokio::fs::write(&audio_path, b"fake audio").await?;
        self.log
            .inner
            .lock()
            .unwrap()
            .downloaded_files
            .push(audio_path.clone());

        Ok(DownloadedAudio {
            audio_path,
            metadata: Some(VideoMetadata {
                id: slug.clone(),
                title: format!("Title {}", slug),
                artist: None,
                uploader: Some("Uploader".to_string()),
            }),
        })
    }
}

pub(crate) struct FakeTranscoder {
    log: ToolLog,
}

impl FakeTranscoder {
    pub(crate) fn new(log: ToolLog) -> Self {
        Self { log }
    }
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn verify(&self, input: &Path) -> Result<(), TranscodeError> {
        self.log.inner.lock().unwrap().verifications += 1;

        if file_name(input).starts_with("corrupt") {
            return Err(TranscodeError::FfmpegFailed {
                code: Some(1),
                stderr: "Invalid data found when processing input".to_string(),
            });
        }
        Ok(())
    }

    async fn to_mp3(&self, input: &Path, output: &Path, _tags: &TrackTags) -> Result<(), TranscodeError> {
        self.log.inner.lock().unwrap().conversions += 1;

        if !input.exists() {
            return Err(TranscodeError::MissingInput(input.to_path_buf()));
        }
        if file_name(input).starts_with("fail-convert") {
            return Err(TranscodeError::FfmpegFailed {
                code: Some(1),
                stderr: "simulated conversion error".to_string(),
            });
        }

        tokio::fs::write(output, b"fake mp3").await?;
        Ok(())
    }
}
