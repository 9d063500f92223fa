//! MP3 transcoding using FFmpeg

use crate::config::AudioConfig;
use crate::error::{stderr_tail, TranscodeError};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// ID3 tags written into the MP3
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackTags {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub comment: Option<String>,
}

#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Decode `input` fully without writing anything, failing if it is unreadable
    async fn verify(&self, input: &Path) -> Result<(), TranscodeError>;

    /// Convert `input` to an MP3 at `output`
    async fn to_mp3(&self, input: &Path, output: &Path, tags: &TrackTags) -> Result<(), TranscodeError>;
}

#[derive(Debug)]
pub struct Ffmpeg {
    ffmpeg_path: PathBuf,
    audio: AudioConfig,
}

impl Ffmpeg {
    pub fn new(ffmpeg_path: PathBuf, audio: AudioConfig) -> Self {
        Self { ffmpeg_path, audio }
    }

    fn mp3_args(&self, input: &Path, output: &Path, tags: &TrackTags) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["-hide_banner".into(), "-loglevel".into(), "error".into()];
        args.push("-i".into());
        args.push(input.into());
        args.extend(["-vn", "-c:a", "libmp3lame"].map(OsString::from));

        match self.audio.bitrate {
            Some(ref bitrate) => {
                args.push("-b:a".into());
                args.push(bitrate.into());
            }
            None => {
                args.push("-q:a".into());
                args.push(self.audio.quality.to_string().into());
            }
        }

        args.extend(["-id3v2_version", "3"].map(OsString::from));

        if self.audio.embed_metadata {
            let fields = [
                ("title", &tags.title),
                ("artist", &tags.artist),
                ("comment", &tags.comment),
            ];
            for (key, value) in fields {
                if let Some(value) = value {
                    args.push("-metadata".into());
                    args.push(format!("{}={}", key, value).into());
                }
            }
        }

        args.push("-y".into());
        args.push(output.into());
        args
    }
}

#[async_trait]
impl Transcoder for Ffmpeg {
    async fn verify(&self, input: &Path) -> Result<(), TranscodeError> {
        debug!("Verifying {}", input.display());

        let output = Command::new(&self.ffmpeg_path)
            .args(["-v", "error", "-i"])
            .arg(input)
            .args(["-f", "null", "-"])
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            return Err(TranscodeError::FfmpegFailed {
                code: output.status.code(),
                stderr: stderr_tail(&output.stderr),
            });
        }
        Ok(())
    }

    async fn to_mp3(&self, input: &Path, output: &Path, tags: &TrackTags) -> Result<(), TranscodeError> {
        if !input.exists() {
            return Err(TranscodeError::MissingInput(input.to_path_buf()));
        }

        info!("Converting to MP3: {}", output.display());

        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(self.mp3_args(input, output, tags));
        cmd.kill_on_drop(true);
        debug!("Running {:?}", cmd.as_std());

        let result = cmd.output().await?;

        if !result.status.success() {
            remove_partial(output).await;
            return Err(TranscodeError::FfmpegFailed {
                code: result.status.code(),
                stderr: stderr_tail(&result.stderr),
            });
        }

        if !output.exists() {
            return Err(TranscodeError::NoOutput(output.to_path_buf()));
        }

        debug!("Encoded to: {}", output.display());
        Ok(())
    }
}

async fn remove_partial(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => debug!("Removed partial output {}", path.display()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove partial output {}: {}", path.display(), e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio(bitrate: Option<&str>, embed_metadata: bool) -> AudioConfig {
        AudioConfig {
            quality: 2,
            bitrate: bitrate.map(String::from),
            embed_metadata,
        }
    }

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter().map(|a| a.to_string_lossy().into_owned()).collect()
    }

    #[test]
    fn test_vbr_args_with_tags() {
        let ffmpeg = Ffmpeg::new(PathBuf::from("ffmpeg"), audio(None, true));
        let tags = TrackTags {
            title: Some("Song".to_string()),
            artist: Some("Band".to_string()),
            comment: None,
        };
        let args = strings(ffmpeg.mp3_args(Path::new("in.webm"), Path::new("out.mp3"), &tags));

        let expected = [
            "-hide_banner", "-loglevel", "error",
            "-i", "in.webm",
            "-vn", "-c:a", "libmp3lame",
            "-q:a", "2",
            "-id3v2_version", "3",
            "-metadata", "title=Song",
            "-metadata", "artist=Band",
            "-y", "out.mp3",
        ];
        assert_eq!(args, expected);
    }

    #[test]
    fn test_bitrate_overrides_quality_and_tags_can_be_disabled() {
        let ffmpeg = Ffmpeg::new(PathBuf::from("ffmpeg"), audio(Some("192k"), false));
        let tags = TrackTags {
            title: Some("Song".to_string()),
            ..Default::default()
        };
        let args = strings(ffmpeg.mp3_args(Path::new("in.webm"), Path::new("out.mp3"), &tags));

        assert!(args.windows(2).any(|w| w == ["-b:a", "192k"]));
        assert!(!args.contains(&"-q:a".to_string()));
        assert!(!args.contains(&"-metadata".to_string()));
    }

    #[tokio::test]
    async fn test_missing_input_is_reported_before_spawning() {
        let dir = tempfile::tempdir().unwrap();
        let ffmpeg = Ffmpeg::new(dir.path().join("no-such-ffmpeg"), audio(None, true));
        let err = ffmpeg
            .to_mp3(&dir.path().join("absent.webm"), &dir.path().join("out.mp3"), &TrackTags::default())
            .await
            .unwrap_err();
        assert!(matches!(err, TranscodeError::MissingInput(_)));
    }

    #[tokio::test]
    async fn test_missing_binary_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let ffmpeg = Ffmpeg::new(dir.path().join("no-such-ffmpeg"), audio(None, true));
        let err = ffmpeg.verify(&dir.path().join("in.webm")).await.unwrap_err();
        assert!(matches!(err, TranscodeError::Io(_)));
    }
}
