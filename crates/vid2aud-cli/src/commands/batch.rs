use anyhow::{bail, Result};
use std::path::Path;
use tokio::sync::mpsc;

use super::{controller, progress, write_report};
use crate::args::RunOptions;
use vid2aud_core::{read_url_list, Config};

pub async fn run(input: &Path, options: &RunOptions, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    let urls = read_url_list(input).await?;
    let total = urls.len();

    if total == 0 {
        println!("No URLs found in input file");
        return Ok(());
    }

    let output_dir = options
        .output
        .clone()
        .unwrap_or_else(|| config.output.directory.clone());

    println!("Processing {} URLs into {}\n", total, output_dir.display());

    let (tx, rx) = mpsc::channel(32);
    let controller = controller(&config, tx)?;
    let progress_handle = progress::spawn(rx, total);

    let result = controller.run_urls(&urls, &output_dir).await;

    // Closing the channel lets the progress task finish
    drop(controller);
    progress_handle.await?;

    println!("\n{}", result);

    if let Some(ref report) = options.report {
        write_report(report, &result)?;
    }

    if !result.all_succeeded() {
        bail!("{} of {} jobs failed", result.failed(), result.len());
    }

    Ok(())
}
