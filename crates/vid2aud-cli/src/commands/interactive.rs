use anyhow::{bail, Context, Result};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use super::{controller, progress, write_report};
use crate::args::RunOptions;
use vid2aud_core::{validate, BatchResult, Config};

pub async fn run(options: &RunOptions, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    let default_dir = options
        .output
        .clone()
        .unwrap_or_else(|| config.output.directory.clone());

    println!("Welcome to vid2aud, the YouTube to MP3 converter!");

    let (url, output_dir) = {
        let stdin = std::io::stdin();
        let mut input = stdin.lock();
        let mut out = std::io::stdout();
        ask(&mut input, &mut out, &default_dir)?
    };
    ensure_valid_url(&url)?;

    let (tx, rx) = mpsc::channel(8);
    let controller = controller(&config, tx)?;
    let progress_handle = progress::spawn(rx, 1);

    let job = controller.run_single(&url, &output_dir).await;

    drop(controller);
    progress_handle.await?;

    if let Some(ref report) = options.report {
        write_report(report, &BatchResult::new(vec![job.clone()]))?;
    }

    match (job.output_path(), job.error()) {
        (Some(output), None) if job.is_done() => {
            println!("\nOutput: {}", output.display());
            Ok(())
        }
        (_, Some(error)) => bail!("{}", error),
        _ => bail!("job ended as {}", job.status()),
    }
}

/// Prompt for the URL and an optional output directory
fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, default_dir: &Path) -> Result<(String, PathBuf)> {
    let url = prompt(input, out, "Enter the YouTube URL: ")?;

    let dir = prompt(
        input,
        out,
        &format!("Output directory [{}]: ", default_dir.display()),
    )?;
    let output_dir = if dir.is_empty() {
        default_dir.to_path_buf()
    } else {
        PathBuf::from(dir)
    };

    Ok((url, output_dir))
}

/// Reject a bad URL before any tool lookup happens
fn ensure_valid_url(url: &str) -> Result<()> {
    if !validate(url) {
        bail!("invalid URL: {:?}", url);
    }
    Ok(())
}

fn prompt<R: BufRead, W: Write>(input: &mut R, out: &mut W, message: &str) -> Result<String> {
    write!(out, "{}", message)?;
    out.flush()?;

    let mut line = String::new();
    input.read_line(&mut line).context("Failed to read from stdin")?;
    Ok(line.trim().to_string())
}
