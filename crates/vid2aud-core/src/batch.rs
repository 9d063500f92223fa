//! Batch controller: validate and run URLs one at a time

use crate::error::{Result, Vid2AudError};
use crate::job::{BatchResult, Job};
use crate::runner::JobRunner;
use crate::validate::validate;

use std::path::Path;
use tracing::{info, warn};

/// Split a URL list into entries: one per non-blank line, trimmed, in order
pub fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}

/// Read a URL list file and split it with [`parse_url_list`]
pub async fn read_url_list(list_path: &Path) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(list_path)
        .await
        .map_err(|source| Vid2AudError::ReadList {
            path: list_path.to_path_buf(),
            source,
        })?;
    Ok(parse_url_list(&content))
}

pub struct BatchController {
    runner: JobRunner,
}

impl BatchController {
    pub fn new(runner: JobRunner) -> Self {
        Self { runner }
    }

    /// Validate one URL and, if it is acceptable, run it
    pub async fn run_single(&self, url: &str, output_dir: &Path) -> Job {
        let url = url.trim();
        if !validate(url) {
            return self.reject(url).await;
        }
        self.runner.run(url, output_dir).await
    }

    /// Run every URL listed in `list_path`, strictly in order.
    ///
    /// Only an unreadable list is an error; per-URL failures are recorded
    /// in the returned [`BatchResult`].
    pub async fn run_batch(&self, list_path: &Path, output_dir: &Path) -> Result<BatchResult> {
        let urls = read_url_list(list_path).await?;
        info!("Processing {} URLs from {}", urls.len(), list_path.display());
        Ok(self.run_urls(&urls, output_dir).await)
    }

    /// Run already-parsed URL list entries, strictly in order
    pub async fn run_urls(&self, urls: &[String], output_dir: &Path) -> BatchResult {
        let total = urls.len();
        let mut jobs = Vec::with_capacity(total);
        for (idx, url) in urls.iter().enumerate() {
            info!("[{}/{}] {}", idx + 1, total, url);
            jobs.push(self.run_single(url, output_dir).await);
        }

        let result = BatchResult::new(jobs);
        info!(
            "Batch finished: {} succeeded, {} failed",
            result.succeeded(),
            result.failed()
        );
        result
    }

    async fn reject(&self, url: &str) -> Job {
        warn!("Skipping invalid URL: {:?}", url);
        let mut job = Job::new(url);
        self.runner.notify(&job).await;
        job.fail(&Vid2AudError::InvalidUrl(url.to_string()));
        self.runner.notify(&job).await;
        job
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::job::JobStatus;
    use crate::testing::{FakeDownloader, FakeTranscoder, ToolLog};

    fn controller(log: &ToolLog, temp_root: &Path) -> BatchController {
        let runner = JobRunner::new(
            Box::new(FakeDownloader::new(log.clone())),
            Box::new(FakeTranscoder::new(log.clone())),
            temp_root,
        )
        .with_verify(true);
        BatchController::new(runner)
    }

    fn write_list(dir: &Path, content: &str) -> std::path::PathBuf {
        let path = dir.join("urls.txt");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_url_list_skips_blank_lines() {
        let content = "https://youtu.be/a\n\n   \nhttps://youtu.be/b\r\n\tnot a url \n";
        assert_eq!(
            parse_url_list(content),
            vec!["https://youtu.be/a", "https://youtu.be/b", "not a url"]
        );
        assert!(parse_url_list("").is_empty());
    }

    #[tokio::test]
    async fn test_one_job_per_non_blank_line_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let log = ToolLog::default();
        let list = write_list(
            dir.path(),
            "https://youtu.be/one\n\nnot a url\n\n\nhttps://www.youtube.com/watch?v=two\n",
        );

        let result = controller(&log, &dir.path().join("tmp"))
            .run_batch(&list, &out)
            .await
            .unwrap();

        let urls: Vec<&str> = result.jobs().iter().map(|j| j.source_url()).collect();
        assert_eq!(
            urls,
            vec![
                "https://youtu.be/one",
                "not a url",
                "https://www.youtube.com/watch?v=two",
            ]
        );
        let statuses: Vec<JobStatus> = result.jobs().iter().map(|j| j.status()).collect();
        assert_eq!(
            statuses,
            vec![JobStatus::Done, JobStatus::Failed, JobStatus::Done]
        );
    }

    #[tokio::test]
    async fn test_invalid_url_never_invokes_tools() {
        let dir = tempfile::tempdir().unwrap();
        let log = ToolLog::default();
        let list = write_list(dir.path(), "not a url\nhttps://vimeo.com/123\n");

        let result = controller(&log, &dir.path().join("tmp"))
            .run_batch(&list, &dir.path().join("out"))
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        for job in result.jobs() {
            assert_eq!(job.status(), JobStatus::Failed);
            assert_eq!(job.error(), Some("invalid URL"));
            assert_eq!(job.error_kind(), Some(ErrorKind::InvalidUrl));
        }
        assert_eq!(log.invocations(), 0);
    }

    #[tokio::test]
    async fn test_failure_does_not_stop_the_batch() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let temp_root = dir.path().join("tmp");
        let log = ToolLog::default();
        let list = write_list(
            dir.path(),
            "https://youtu.be/fail-download\nhttps://youtu.be/good\n",
        );

        let result = controller(&log, &temp_root)
            .run_batch(&list, &out)
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result.failed(), 1);
        assert_eq!(result.succeeded(), 1);
        assert!(!result.all_succeeded());

        let jobs = result.jobs();
        assert_eq!(jobs[0].status(), JobStatus::Failed);
        assert_eq!(jobs[0].source_url(), "https://youtu.be/fail-download");
        assert_eq!(jobs[1].status(), JobStatus::Done);
        assert_eq!(jobs[1].output_path().unwrap(), out.join("Title good.mp3"));
        assert!(out.join("Title good.mp3").exists());

        // downloader ran for both, converter only for the second
        assert_eq!(log.downloads().len(), 2);
        assert_eq!(log.conversions(), 1);
        assert!(std::fs::read_dir(&temp_root).unwrap().next().is_none());
    }

    #[tokio::test]
    async fn test_unreadable_list_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let log = ToolLog::default();

        let err = controller(&log, dir.path())
            .run_batch(&dir.path().join("missing.txt"), dir.path())
            .await
            .unwrap_err();

        assert!(matches!(err, Vid2AudError::ReadList { .. }));
        assert_eq!(err.kind(), ErrorKind::Filesystem);
    }

    #[tokio::test]
    async fn test_empty_list_gives_empty_result() {
        let dir = tempfile::tempdir().unwrap();
        let log = ToolLog::default();
        let list = write_list(dir.path(), "\n\n");

        let result = controller(&log, dir.path())
            .run_batch(&list, dir.path())
            .await
            .unwrap();

        assert!(result.is_empty());
        assert!(result.all_succeeded());
    }

    #[tokio::test]
    async fn test_list_read_once_then_run_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let log = ToolLog::default();
        let list = write_list(dir.path(), "https://youtu.be/first

https://youtu.be/second
");

        let urls = read_url_list(&list).await.unwrap();
        assert_eq!(urls, vec!["https://youtu.be/first", "https://youtu.be/second"]);

        // the file is no longer needed once parsed
        std::fs::remove_file(&list).unwrap();

        let result = controller(&log, &dir.path().join("tmp"))
            .run_urls(&urls, &out)
            .await;
        let titles: Vec<Option<&str>> = result.jobs().iter().map(|j| j.title()).collect();
        assert_eq!(titles, vec![Some("Title first"), Some("Title second")]);
        assert!(result.all_succeeded());
    }

    #[tokio::test]
    async fn test_read_url_list_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_url_list(&dir.path().join("missing.txt")).await.unwrap_err();
        assert!(matches!(err, Vid2AudError::ReadList { .. }));
    }

    #[tokio::test]
    async fn test_run_single_trims_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let log = ToolLog::default();
        let controller = controller(&log, &dir.path().join("tmp"));

        let job = controller
            .run_single("  https://youtu.be/single  ", &dir.path().join("out"))
            .await;
        assert_eq!(job.source_url(), "https://youtu.be/single");
        assert!(job.is_done());

        let job = controller.run_single("", &dir.path().join("out")).await;
        assert!(job.is_failed());
        assert_eq!(log.downloads().len(), 1);
    }
}
