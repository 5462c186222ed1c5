//! Single URL download logic.

use std::path::{Path, PathBuf};

use crate::download::pipeline::TaskProcessor;
use crate::download::state::{DownloadTask, TaskStatus};
use crate::error::Result;
use crate::fs::single_output_path;
use crate::output::create_spinner;
use crate::page::extract_id;

/// Build the task for a single share URL.
pub fn plan_single(share_url: &str, out: Option<&Path>, container: &str) -> Result<DownloadTask> {
    let id = extract_id(share_url)?;
    let output = single_output_path(out, &id, container)?;
    Ok(DownloadTask::new(share_url.trim(), id, output))
}

/// Download one share URL. Errors are returned to the caller unchanged.
pub async fn download_single<P: TaskProcessor + ?Sized>(
    processor: &P,
    task: &mut DownloadTask,
    show_progress: bool,
) -> Result<PathBuf> {
    tracing::info!("Downloading {} -> {}", task.source, task.output.display());

    let spinner = show_progress.then(|| create_spinner(&format!("Fetching {}", task.share_id)));
    task.status = TaskStatus::Running;

    let result = processor.process(task).await;

    if let Some(sp) = spinner {
        sp.finish_and_clear();
    }

    match &result {
        Ok(path) => {
            task.status = TaskStatus::Succeeded(path.clone());
            tracing::info!("Single download complete: {}", path.display());
        }
        Err(e) => {
            task.status = TaskStatus::Failed(e.to_string());
            tracing::error!(
                "Single download of {} failed after {} attempt(s): {}",
                task.source,
                task.attempts,
                e
            );
        }
    }

    result
}
