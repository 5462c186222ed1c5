//! List mode: bounded worker pool over a queue of share URLs.

use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::dedup::DedupLog;
use crate::download::pipeline::TaskProcessor;
use crate::download::state::{BatchReport, DownloadTask, TaskStatus};
use crate::fs::batch_output_path;
use crate::output::create_item_bar;
use crate::page::extract_id;

/// Scheduling settings for a list download.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Number of workers.
    pub concurrency: usize,
    /// Pause a worker takes after a success before picking up its next URL.
    pub cooldown: Duration,
    pub show_progress: bool,
}

/// Turn list entries into download tasks.
///
/// Entries already in the done log, or repeated earlier in the list, are
/// skipped. Entries without a share id are reported as failures.
pub fn plan_tasks(
    urls: &[String],
    log: &DedupLog,
    out_dir: &Path,
    prefix: Option<&str>,
    container: &str,
    report: &mut BatchReport,
) -> Vec<DownloadTask> {
    let mut seen = HashSet::new();
    let mut tasks = Vec::new();
    report.listed += urls.len() as u64;

    for url in urls {
        if log.contains(url) {
            tracing::debug!("Already downloaded, skipping: {}", url);
            report.skipped += 1;
            continue;
        }

        if !seen.insert(url.as_str()) {
            tracing::debug!("Repeated in list, skipping: {}", url);
            report.skipped += 1;
            continue;
        }

        let planned = extract_id(url).and_then(|id| {
            let output = batch_output_path(out_dir, prefix, &id, container)?;
            Ok((id, output))
        });
        match planned {
            Ok((id, output)) => tasks.push(DownloadTask::new(url.clone(), id, output)),
            Err(e) => {
                tracing::warn!("Skipping {}: {}", url, e);
                report.add_failure(url, e.to_string());
            }
        }
    }

    tasks
}

/// Run every task with at most `options.concurrency` in flight.
///
/// Each worker takes the next queued task as soon as it is free, so a slow
/// download never holds back the others. A failed task is logged and left out
/// of the done log; a successful one is appended to it immediately. Tasks start
/// in list order but may finish in any order.
pub async fn run_batch<P: TaskProcessor + ?Sized>(
    tasks: Vec<DownloadTask>,
    processor: &P,
    log: &DedupLog,
    options: &BatchOptions,
    report: &mut BatchReport,
) {
    if tasks.is_empty() {
        return;
    }

    let total = tasks.len();
    let workers = options.concurrency.clamp(1, total);
    tracing::info!("Downloading {} URLs with {} workers", total, workers);

    let progress = options
        .show_progress
        .then(|| create_item_bar(total as u64, "Downloading"));

    let queue = Mutex::new(VecDeque::from(tasks));
    let finished = Mutex::new(Vec::with_capacity(total));

    let worker = |worker_id: usize| {
        let queue = &queue;
        let finished = &finished;
        let progress = progress.as_ref();

        async move {
            loop {
                let Some(mut task) = queue.lock().await.pop_front() else {
                    break;
                };

                task.status = TaskStatus::Running;
                tracing::debug!("Worker {} starting {}", worker_id, task.source);

                let succeeded = match processor.process(&mut task).await {
                    Ok(path) => {
                        tracing::info!("Downloaded {} -> {}", task.source, path.display());
                        if let Err(e) = log.append(&task.source).await {
                            tracing::error!(
                                "Could not record {} in {}: {}",
                                task.source,
                                log.path().display(),
                                e
                            );
                        }
                        task.status = TaskStatus::Succeeded(path);
                        true
                    }
                    Err(e) => {
                        tracing::warn!(
                            "Failed {} after {} attempt(s): {}",
                            task.source,
                            task.attempts,
                            e
                        );
                        task.status = TaskStatus::Failed(e.to_string());
                        false
                    }
                };

                finished.lock().await.push(task);
                if let Some(pb) = progress {
                    pb.inc(1);
                }

                if succeeded && !options.cooldown.is_zero() && !queue.lock().await.is_empty() {
                    sleep(options.cooldown).await;
                }
            }
        }
    };

    join_all((0..workers).map(worker)).await;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    for task in finished.into_inner() {
        report.add_task(&task);
    }
}
