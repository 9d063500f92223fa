//! YouTube audio downloader using yt-dlp

use crate::error::{stderr_tail, DownloadError};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info};
use uuid::Uuid;

/// What a finished download left behind in the scratch directory
#[derive(Debug, Clone)]
pub struct DownloadedAudio {
    pub audio_path: PathBuf,
    pub metadata: Option<VideoMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoMetadata {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
}

impl VideoMetadata {
    /// Artist tag: the track artist when YouTube knows it, else the uploader
    pub fn artist_tag(&self) -> Option<&str> {
        self.artist.as_deref().or(self.uploader.as_deref())
    }
}

/// Fetches the audio stream for a URL into a scratch directory
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn fetch_audio(&self, url: &str, dest_dir: &Path) -> Result<DownloadedAudio, DownloadError>;
}

#[derive(Debug)]
pub struct YtDlp {
    yt_dlp_path: PathBuf,
    format: String,
}

impl YtDlp {
    pub fn new(yt_dlp_path: PathBuf, format: impl Into<String>) -> Self {
        Self {
            yt_dlp_path,
            format: format.into(),
        }
    }

    fn command(&self, url: &str, output_template: &Path) -> Command {
        let mut cmd = Command::new(&self.yt_dlp_path);
        cmd.arg("-f").arg(&self.format);
        cmd.args(["--no-playlist", "--no-progress", "--print-json"]);
        cmd.arg("-o").arg(output_template);
        // Keep a URL starting with '-' from being read as an option
        cmd.arg("--").arg(url);
        cmd.kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Downloader for YtDlp {
    async fn fetch_audio(&self, url: &str, dest_dir: &Path) -> Result<DownloadedAudio, DownloadError> {
        info!("Downloading audio from: {}", url);

        let stem = Uuid::new_v4().simple().to_string();
        let output_template = dest_dir.join(format!("{}.%(ext)s", stem));

        let mut cmd = self.command(url, &output_template);
        debug!("Running {:?}", cmd.as_std());
        let output = cmd.output().await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr: {}", stderr);

            if stderr.contains("Video unavailable") || stderr.contains("Private video") {
                return Err(DownloadError::VideoUnavailable(url.to_string()));
            }

            return Err(DownloadError::YtDlpFailed {
                code: output.status.code(),
                stderr: stderr_tail(&output.stderr),
            });
        }

        let metadata = parse_metadata(&String::from_utf8_lossy(&output.stdout));
        match metadata {
            Some(ref m) => debug!("Downloaded: {} ({})", m.title, m.id),
            None => debug!("yt-dlp printed no usable metadata"),
        }

        let audio_path = find_audio_file(dest_dir, &stem).await?;

        Ok(DownloadedAudio {
            audio_path,
            metadata,
        })
    }
}

/// yt-dlp prints one JSON object per downloaded entry; the last one wins
fn parse_metadata(stdout: &str) -> Option<VideoMetadata> {
    stdout
        .lines()
        .rev()
        .map(str::trim)
        .filter(|l| l.starts_with('{'))
        .find_map(|l| serde_json::from_str(l).ok())
}

async fn find_audio_file(dir: &Path, stem: &str) -> Result<PathBuf, DownloadError> {
    let prefix = format!("{}.", stem);
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let partial = name.ends_with(".part") || name.ends_with(".ytdl");
        if name.starts_with(&prefix) && !partial && entry.file_type().await?.is_file() {
            debug!("Found audio file: {}", entry.path().display());
            return Ok(entry.path());
        }
    }

    Err(DownloadError::NoOutput)
}
