//! Per-task download pipeline: fetch, extract, download.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::download::retry::BackoffPolicy;
use crate::download::state::DownloadTask;
use crate::download::tools::ToolInvoker;
use crate::error::{Error, Result};
use crate::extract::{self, ExtractionResult, MediaKind, ResolvedUrl, Strategy};
use crate::fs::ensure_parent_dir;
use crate::page::PageFetcher;

/// Anything that can carry a [`DownloadTask`] to a finished file.
#[async_trait]
pub trait TaskProcessor: Send + Sync {
    /// Download `task`, returning the path of the produced file.
    async fn process(&self, task: &mut DownloadTask) -> Result<PathBuf>;
}

/// The production pipeline.
///
/// Share page → extraction (→ legacy endpoint when enabled) → download with
/// backoff. Direct media files are streamed over HTTP; manifests and
/// unrecognised URLs go through the external tools.
pub struct Pipeline {
    fetcher: PageFetcher,
    invoker: ToolInvoker,
    policy: BackoffPolicy,
    use_fallback: bool,
    show_progress: bool,
}

impl Pipeline {
    pub fn new(fetcher: PageFetcher, invoker: ToolInvoker, policy: BackoffPolicy) -> Self {
        Self {
            fetcher,
            invoker,
            policy,
            use_fallback: false,
            show_progress: false,
        }
    }

    /// Consult the legacy resolve endpoint when the share page yields nothing.
    pub fn with_fallback(mut self, enabled: bool) -> Self {
        self.use_fallback = enabled;
        self
    }

    /// Show a byte progress bar for large direct transfers.
    pub fn with_progress(mut self, enabled: bool) -> Self {
        self.show_progress = enabled;
        self
    }

    /// Find the media URL for a task.
    pub async fn resolve(&self, task: &DownloadTask) -> Result<ResolvedUrl> {
        let page_error = match self.fetcher.fetch_page(&task.source).await {
            Ok(html) => match extract::extract(&html) {
                ExtractionResult::Found(resolved) => {
                    tracing::info!(
                        "Resolved {} via {}: {}",
                        task.share_id,
                        resolved.strategy,
                        resolved.url
                    );
                    return Ok(resolved);
                }
                ExtractionResult::NotFound => {
                    Error::ExtractionFailed(task.share_id.to_string())
                }
            },
            Err(e) => e,
        };

        if !self.use_fallback || !self.fetcher.has_fallback() {
            return Err(page_error);
        }

        tracing::warn!(
            "Share page gave no media URL ({}); trying the legacy endpoint",
            page_error
        );

        match self.fetcher.fetch_fallback(&task.source, &task.share_id).await {
            Ok(url) => {
                tracing::info!(
                    "Resolved {} via {}: {}",
                    task.share_id,
                    Strategy::FallbackEndpoint,
                    url
                );
                Ok(ResolvedUrl::new(url, Strategy::FallbackEndpoint))
            }
            Err(fallback_error) => Err(Error::ExtractionFailed(format!(
                "{} (page: {}; fallback: {})",
                task.share_id, page_error, fallback_error
            ))),
        }
    }

    /// One download attempt of a resolved URL.
    async fn download_once(&self, resolved: &ResolvedUrl, output: &Path) -> Result<PathBuf> {
        match resolved.media_kind() {
            MediaKind::File => {
                self.fetcher
                    .transfer(&resolved.url, output, self.show_progress)
                    .await
            }
            MediaKind::Stream => self.invoker.download(&resolved.url, output).await,
        }
    }
}

#[async_trait]
impl TaskProcessor for Pipeline {
    async fn process(&self, task: &mut DownloadTask) -> Result<PathBuf> {
        let resolved = self.resolve(task).await?;
        ensure_parent_dir(&task.output).await?;

        let mut attempts = 0u32;
        let output = task.output.clone();
        let result = self
            .policy
            .run(|| {
                attempts += 1;
                self.download_once(&resolved, &output)
            })
            .await;
        task.attempts += attempts;

        result
    }
}
