pub mod batch;
pub mod config;
pub mod doctor;
pub mod interactive;
mod progress;

use anyhow::{Context, Result};
use std::path::Path;
use tokio::sync::mpsc;
use vid2aud_core::{BatchController, BatchResult, Config, JobEvent, JobRunner};

/// Controller wired to the configured yt-dlp and FFmpeg, reporting progress on `tx`
fn controller(config: &Config, tx: mpsc::Sender<JobEvent>) -> Result<BatchController> {
    let runner_config = config
        .runner_config()
        .context("Required tools are missing. Run `vid2aud doctor` for details")?;

    Ok(BatchController::new(
        JobRunner::from_config(&runner_config).with_progress(tx),
    ))
}

fn write_report(path: &Path, result: &BatchResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    println!("Report written to {}", path.display());
    Ok(())
}
