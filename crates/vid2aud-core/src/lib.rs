//! vid2aud-core: download YouTube audio with yt-dlp and convert it to MP3 with FFmpeg

pub mod batch;
pub mod config;
pub mod downloader;
pub mod error;
pub mod job;
pub mod naming;
pub mod runner;
pub mod transcoder;
pub mod validate;

#[cfg(test)]
mod testing;

pub use batch::{parse_url_list, read_url_list, BatchController};
pub use config::{Config, RunnerConfig};
pub use error::{ErrorKind, Result, Vid2AudError};
pub use job::{BatchResult, Job, JobEvent, JobStatus};
pub use runner::JobRunner;
pub use validate::validate;
