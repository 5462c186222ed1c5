//! share-dl - download videos from share pages
//!
//! This library resolves the media URL behind a video share page and downloads
//! it, either directly over HTTP or through yt-dlp / ffmpeg.
//!
//! # Features
//!
//! - Media URL extraction with ordered fallback strategies
//! - Legacy resolve endpoint for single downloads
//! - Exponential backoff around download attempts
//! - Bounded-concurrency list downloads with a cooldown between items
//! - Resumable list downloads via a persistent done log
//!
//! # Example
//!
//! ```no_run
//! use share_dl::{
//!     download::{download_single, plan_single, BackoffPolicy, Pipeline, ToolInvoker, ToolSet},
//!     page::PageFetcher,
//!     Config,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let fetcher = PageFetcher::new(&config.http)?;
//!     let invoker = ToolInvoker::new(ToolSet::detect()?, &config.tools, fetcher.user_agent());
//!     let pipeline = Pipeline::new(fetcher, invoker, BackoffPolicy::from(&config.retry))
//!         .with_fallback(true);
//!
//!     let mut task = plan_single("https://example.com/share/abc123", None, "mp4")?;
//!     let path = download_single(&pipeline, &mut task, false).await?;
//!     println!("saved {}", path.display());
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod config;
pub mod dedup;
pub mod download;
pub mod error;
pub mod extract;
pub mod fs;
pub mod output;
pub mod page;

// Re-exports for convenience
pub use config::{Config, RunMode};
pub use dedup::DedupLog;
pub use download::{run_batch, BatchReport, DownloadTask, Pipeline, TaskProcessor};
pub use error::{Error, Result};
pub use extract::{extract, ExtractionResult, ResolvedUrl, Strategy};
pub use page::{extract_id, PageFetcher, ShareReference};
