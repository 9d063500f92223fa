//! Configuration management for vid2aud

use crate::error::ConfigError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub tools: ToolsConfig,
    pub output: OutputConfig,
    pub download: DownloadConfig,
    pub audio: AudioConfig,
    pub temp: TempConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to yt-dlp binary (auto-detected if not set)
    pub yt_dlp: Option<PathBuf>,
    /// Path to FFmpeg binary (auto-detected if not set)
    pub ffmpeg: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output directory
    pub directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// yt-dlp format selector
    pub format: String,
    /// Decode the downloaded file once before converting it
    pub verify: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// LAME VBR quality, 0 (best) to 9
    pub quality: u8,
    /// Constant bitrate such as "192k"; overrides `quality` when set
    pub bitrate: Option<String>,
    /// Write title/artist ID3 tags from the video metadata
    pub embed_metadata: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TempConfig {
    /// Custom temp directory (uses system temp if not set)
    pub directory: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tools: ToolsConfig::default(),
            output: OutputConfig {
                directory: PathBuf::from("."),
            },
            download: DownloadConfig {
                format: "bestaudio/best".to_string(),
                verify: true,
            },
            audio: AudioConfig {
                quality: 2,
                bitrate: None,
                embed_metadata: true,
            },
            temp: TempConfig::default(),
        }
    }
}

/// Settings the job runner needs, with tool paths already resolved
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub yt_dlp: PathBuf,
    pub ffmpeg: PathBuf,
    pub temp_root: PathBuf,
    pub download: DownloadConfig,
    pub audio: AudioConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        if let Some(default_config) = Self::default_config_path() {
            if default_config.exists() {
                figment = figment.merge(Toml::file(&default_config));
            }
        }

        if let Some(path) = config_file {
            if !path.exists() {
                return Err(ConfigError::LoadError(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }

        // VID2AUD_AUDIO__QUALITY=0 -> audio.quality
        figment = figment.merge(Env::prefixed("VID2AUD_").split("__"));

        let config: Config = figment
            .extract()
            .map_err(|e| ConfigError::LoadError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Location of the per-user config file
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("vid2aud/config.toml"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.audio.quality > 9 {
            return Err(ConfigError::InvalidValue(format!(
                "audio.quality must be between 0 and 9, got {}",
                self.audio.quality
            )));
        }
        if self.download.format.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "download.format must not be empty".to_string(),
            ));
        }
        if let Some(ref bitrate) = self.audio.bitrate {
            let digits = bitrate.trim_end_matches(['k', 'K']);
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(ConfigError::InvalidValue(format!(
                    "audio.bitrate must look like \"192k\", got {:?}",
                    bitrate
                )));
            }
        }
        Ok(())
    }

    /// Get yt-dlp path, auto-detecting if not configured
    pub fn yt_dlp_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.tools.yt_dlp {
            Ok(path.clone())
        } else {
            which::which("yt-dlp").map_err(|_| ConfigError::ToolNotFound("yt-dlp"))
        }
    }

    /// Get FFmpeg path, auto-detecting if not configured
    pub fn ffmpeg_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.tools.ffmpeg {
            Ok(path.clone())
        } else {
            which::which("ffmpeg").map_err(|_| ConfigError::ToolNotFound("ffmpeg"))
        }
    }

    /// Get temp directory
    pub fn temp_dir(&self) -> PathBuf {
        self.temp.directory.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Resolve tool paths and collect everything a job run needs
    pub fn runner_config(&self) -> Result<RunnerConfig, ConfigError> {
        Ok(RunnerConfig {
            yt_dlp: self.yt_dlp_path()?,
            ffmpeg: self.ffmpeg_path()?,
            temp_root: self.temp_dir(),
            download: self.download.clone(),
            audio: self.audio.clone(),
        })
    }
}
