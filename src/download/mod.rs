//! Download module.
//!
//! This module provides:
//! - Task and batch state tracking
//! - The per-task pipeline (fetch, extract, download)
//! - Exponential backoff around download attempts
//! - External tool detection and invocation
//! - Single and list download drivers

pub mod batch;
pub mod pipeline;
pub mod retry;
pub mod single;
pub mod state;
pub mod tools;

pub use batch::{plan_tasks, run_batch, BatchOptions};
pub use pipeline::{Pipeline, TaskProcessor};
pub use retry::{run_with_backoff, BackoffPolicy};
pub use single::{download_single, plan_single};
pub use state::{BatchReport, DownloadTask, TaskStatus};
pub use tools::{run_process, Invocation, ProcessOutput, ToolInvoker, ToolSet};
