use anyhow::Result;
use std::path::Path;
use vid2aud_core::Config;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("vid2aud configuration\n");
    println!("{}", toml::to_string_pretty(&config)?);

    if config.tools.yt_dlp.is_none() || config.tools.ffmpeg.is_none() {
        println!("# tools not listed above are auto-detected on PATH");
    }
    if config.temp.directory.is_none() {
        println!("# temp.directory unset: using {}", config.temp_dir().display());
    }

    // Show config file locations
    println!("\nConfig file locations (in priority order):");
    println!("  1. Environment variables (VID2AUD_*, `__` between section and key)");
    if let Some(p) = config_path {
        println!("  2. {} (specified)", p.display());
    }
    if let Some(default_path) = Config::default_config_path() {
        println!("  3. {}", default_path.display());
    }

    Ok(())
}
