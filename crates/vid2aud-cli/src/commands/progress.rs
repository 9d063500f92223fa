use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use vid2aud_core::{JobEvent, JobStatus};

/// Drive one spinner per job from the runner's events until the sender is dropped
pub fn spawn(mut rx: mpsc::Receiver<JobEvent>, total: usize) -> JoinHandle<()> {
    tokio::spawn(async move {
        let style = ProgressStyle::with_template("{spinner:.cyan} [{elapsed_precise}] {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("=>-");

        let mut index = 0;
        let mut current: Option<ProgressBar> = None;

        while let Some(event) = rx.recv().await {
            if event.status == JobStatus::Pending {
                index += 1;
                let pb = ProgressBar::new_spinner();
                pb.set_style(style.clone());
                pb.enable_steady_tick(Duration::from_millis(100));
                current = Some(pb);
            }

            let Some(ref pb) = current else { continue };
            let prefix = format!("[{}/{}]", index, total);

            match event.status {
                JobStatus::Pending => {
                    pb.set_message(format!("{} {}", prefix, truncate(&event.url, 50)));
                }
                JobStatus::Downloading => {
                    pb.set_message(format!("{} Downloading: {}", prefix, truncate(&event.url, 50)));
                }
                JobStatus::Converting => {
                    let title = event.title.as_deref().unwrap_or(&event.url);
                    pb.set_message(format!("{} Converting: {}", prefix, truncate(title, 50)));
                }
                JobStatus::Done => {
                    let name = event
                        .output_path
                        .as_deref()
                        .and_then(|p| p.file_name())
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    pb.finish_with_message(format!("{} Done: {}", prefix, name));
                }
                JobStatus::Failed => {
                    pb.abandon_with_message(format!(
                        "{} Failed: {} - {}",
                        prefix,
                        truncate(&event.url, 50),
                        event.error.as_deref().unwrap_or("unknown error")
                    ));
                }
            }
        }
    })
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
