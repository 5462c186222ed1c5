//! Persistent log of completed share URLs.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::Result;

/// Append-only record of share URLs that downloaded successfully.
///
/// Read once when a batch starts. Entries are never removed or rewritten,
/// and membership only reflects the file as it was at load time.
#[derive(Debug)]
pub struct DedupLog {
    path: PathBuf,
    entries: HashSet<String>,
    writer: Mutex<()>,
}

impl DedupLog {
    /// Load the log, treating a missing file as empty.
    pub async fn load(path: &Path) -> Result<Self> {
        let entries = match tokio::fs::read_to_string(path).await {
            Ok(content) => content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashSet::new(),
            Err(e) => return Err(e.into()),
        };

        tracing::debug!(
            "Loaded {} completed URLs from {}",
            entries.len(),
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            entries,
            writer: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `url` was recorded before this run started.
    pub fn contains(&self, url: &str) -> bool {
        self.entries.contains(url.trim())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a completed URL on disk.
    pub async fn append(&self, url: &str) -> Result<()> {
        let _guard = self.writer.lock().await;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{}\n", url.trim()).as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let log = DedupLog::load(&dir.path().join("done.log")).await.unwrap();
        assert!(log.is_empty());
    }

    #[tokio::test]
    async fn test_load_skips_blank_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("done.log");
        std::fs::write(&path, "https://a/share/1\n\n  https://a/share/2  \n").unwrap();

        let log = DedupLog::load(&path).await.unwrap();
        assert_eq!(log.len(), 2);
        assert!(log.contains("https://a/share/1"));
        assert!(log.contains("https://a/share/2"));
        assert!(!log.contains("https://a/share/3"));
    }

    #[tokio::test]
    async fn test_append_keeps_existing_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("done.log");

        let log = DedupLog::load(&path).await.unwrap();
        log.append("https://a/share/1").await.unwrap();
        log.append("https://a/share/2").await.unwrap();

        // Membership is fixed at load time
        assert!(!log.contains("https://a/share/1"));

        let reloaded = DedupLog::load(&path).await.unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "https://a/share/1\nhttps://a/share/2\n"
        );
    }
}
