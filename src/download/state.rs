//! Download task and batch state tracking.

use std::path::PathBuf;

use crate::page::ShareReference;

/// Lifecycle of one download task.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TaskStatus {
    #[default]
    Pending,
    Running,
    Succeeded(PathBuf),
    Failed(String),
}

/// One share URL to download, created per list entry or single invocation.
#[derive(Debug, Clone)]
pub struct DownloadTask {
    /// The share URL exactly as given; this is what the done log records.
    pub source: String,
    pub share_id: ShareReference,
    pub output: PathBuf,
    /// Download attempts made so far.
    pub attempts: u32,
    pub status: TaskStatus,
}

impl DownloadTask {
    pub fn new(source: impl Into<String>, share_id: ShareReference, output: PathBuf) -> Self {
        Self {
            source: source.into(),
            share_id,
            output,
            attempts: 0,
            status: TaskStatus::Pending,
        }
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self.status, TaskStatus::Succeeded(_))
    }
}

/// Outcome of a list download.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Entries read from the list file.
    pub listed: u64,
    /// Entries skipped because the done log already had them, or repeated in the list.
    pub skipped: u64,
    pub succeeded: u64,
    /// Source URL and reason for every failed entry.
    pub failures: Vec<(String, String)>,
}

impl BatchReport {
    /// Record a finished task.
    pub fn add_task(&mut self, task: &DownloadTask) {
        match &task.status {
            TaskStatus::Succeeded(_) => self.succeeded += 1,
            TaskStatus::Failed(reason) => {
                self.failures.push((task.source.clone(), reason.clone()));
            }
            TaskStatus::Pending | TaskStatus::Running => {}
        }
    }

    /// Record an entry that failed before a task could be created.
    pub fn add_failure(&mut self, source: &str, reason: String) {
        self.failures.push((source.to_string(), reason));
    }

    pub fn failed(&self) -> u64 {
        self.failures.len() as u64
    }

    /// Entries that reached a download attempt or failed setup.
    pub fn attempted(&self) -> u64 {
        self.succeeded + self.failed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::extract_id;

    fn task(url: &str) -> DownloadTask {
        DownloadTask::new(url, extract_id(url).unwrap(), PathBuf::from("out.mp4"))
    }

    #[test]
    fn test_report_counts() {
        let mut report = BatchReport::default();

        let mut ok = task("https://example.com/share/a");
        ok.status = TaskStatus::Succeeded(PathBuf::from("a.mp4"));
        let mut bad = task("https://example.com/share/b");
        bad.status = TaskStatus::Failed("boom".into());

        report.add_task(&ok);
        report.add_task(&bad);
        report.add_failure("not a url", "Invalid share URL".into());

        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.attempted(), 3);
        assert_eq!(report.failures[0].0, "https://example.com/share/b");
    }

    #[test]
    fn test_new_task_is_pending() {
        let t = task("https://example.com/share/a");
        assert_eq!(t.status, TaskStatus::Pending);
        assert_eq!(t.attempts, 0);
        assert!(!t.is_succeeded());
    }
}
