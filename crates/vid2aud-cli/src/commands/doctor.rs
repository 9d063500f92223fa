use anyhow::{bail, Result};
use std::path::Path;
use std::process::Command;
use tracing::debug;
use vid2aud_core::{error::ConfigError, Config};

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("vid2aud dependency check\n");

    let mut all_ok = true;

    print!("yt-dlp:  ");
    all_ok &= report(config.yt_dlp_path(), "--version", "brew install yt-dlp  (or: pipx install yt-dlp)", |out| {
        out.trim().to_string()
    });

    print!("ffmpeg:  ");
    all_ok &= report(config.ffmpeg_path(), "-version", "brew install ffmpeg  (or your package manager)", |out| {
        // "ffmpeg version 6.1.1 Copyright ..." -> "6.1.1"
        out.lines()
            .next()
            .and_then(|l| l.split_whitespace().nth(2))
            .unwrap_or("unknown")
            .to_string()
    });

    print!("temp:    ");
    let temp_dir = config.temp_dir();
    if temp_dir.is_dir() {
        println!("OK ({})", temp_dir.display());
    } else {
        println!("MISSING ({})", temp_dir.display());
        println!("         Will be created on first use");
    }

    println!();
    if all_ok {
        println!("All dependencies OK!");
        Ok(())
    } else {
        bail!("Some dependencies are missing. See above for installation instructions.")
    }
}

/// Print the status line for one tool; returns whether it is usable
fn report(
    path: Result<std::path::PathBuf, ConfigError>,
    version_flag: &str,
    install_hint: &str,
    parse_version: impl Fn(&str) -> String,
) -> bool {
    let path = match path {
        Ok(path) => path,
        Err(e) => {
            println!("NOT FOUND ({})", e);
            println!("         Install with: {}", install_hint);
            return false;
        }
    };

    debug!("Probing {}", path.display());
    match Command::new(&path).arg(version_flag).output() {
        Ok(out) if out.status.success() => {
            let version = parse_version(&String::from_utf8_lossy(&out.stdout));
            println!("OK ({}, {})", version, path.display());
            true
        }
        Ok(out) => {
            println!("FOUND but `{} {}` exited with {:?}", path.display(), version_flag, out.status.code());
            false
        }
        Err(e) => {
            println!("FOUND at {} but failed to run: {}", path.display(), e);
            false
        }
    }
}
