//! Error types for vid2aud-core

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Vid2AudError>;

/// Coarse classification of a job failure, recorded on the job and in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidUrl,
    Download,
    Conversion,
    Filesystem,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidUrl => write!(f, "invalid URL"),
            ErrorKind::Download => write!(f, "download"),
            ErrorKind::Conversion => write!(f, "conversion"),
            ErrorKind::Filesystem => write!(f, "filesystem"),
        }
    }
}

#[derive(Error, Debug)]
pub enum Vid2AudError {
    #[error("invalid URL")]
    InvalidUrl(String),

    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("Conversion failed: {0}")]
    Transcode(#[from] TranscodeError),

    #[error("Failed to read URL list {}: {source}", .path.display())]
    ReadList {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to prepare {}: {source}", .path.display())]
    Prepare {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Vid2AudError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Vid2AudError::InvalidUrl(_) => ErrorKind::InvalidUrl,
            Vid2AudError::Download(_) => ErrorKind::Download,
            Vid2AudError::Transcode(_) => ErrorKind::Conversion,
            Vid2AudError::ReadList { .. } | Vid2AudError::Prepare { .. } => ErrorKind::Filesystem,
        }
    }
}

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("yt-dlp exited with code {code:?}: {stderr}")]
    YtDlpFailed { code: Option<i32>, stderr: String },

    #[error("Video unavailable or private: {0}")]
    VideoUnavailable(String),

    #[error("yt-dlp reported success but produced no audio file")]
    NoOutput,

    #[error("Downloaded file is corrupted or unreadable: {0}")]
    Corrupt(String),

    #[error("Failed to run yt-dlp: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum TranscodeError {
    #[error("FFmpeg exited with code {code:?}: {stderr}")]
    FfmpegFailed { code: Option<i32>, stderr: String },

    #[error("FFmpeg reported success but {} was not created", .0.display())]
    NoOutput(PathBuf),

    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("Failed to run FFmpeg: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(String),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),

    #[error("{0} not found in PATH")]
    ToolNotFound(&'static str),
}

/// Trim captured stderr to its last few meaningful lines for error text
pub(crate) fn stderr_tail(stderr: &[u8]) -> String {
    const MAX_LINES: usize = 5;

    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let start = lines.len().saturating_sub(MAX_LINES);
    let tail = lines[start..].join("\n");

    if tail.is_empty() {
        "no error output".to_string()
    } else {
        tail
    }
}
