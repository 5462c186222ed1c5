//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

/// share-dl CLI.
#[derive(Parser, Debug)]
#[command(
    name = "share-dl",
    version,
    about = "Download videos from share pages",
    long_about = "Scrape a video share page for its media URL and download it with \
                  yt-dlp or ffmpeg.\n\n\
                  Downloads one share URL (--url) or every URL of a list file (--list)."
)]
pub struct Args {
    /// Share URL to download.
    #[arg(short, long, conflicts_with = "list")]
    pub url: Option<String>,

    /// File with one share URL per line.
    #[arg(short, long)]
    pub list: Option<PathBuf>,

    /// Filename prefix for list downloads.
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Output file (with --url) or directory (with --list).
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Delay between list downloads in milliseconds.
    #[arg(short, long, allow_negative_numbers = true)]
    pub timeout: Option<i64>,

    /// Path to configuration file.
    #[arg(short, long, env = "SHARE_DL_CONFIG", default_value = "share-dl.toml")]
    pub config: PathBuf,

    /// Number of list downloads in flight at once.
    #[arg(short = 'j', long)]
    pub concurrency: Option<usize>,

    /// File recording completed share URLs.
    #[arg(long)]
    pub done_log: Option<PathBuf>,

    /// Download attempts per URL.
    #[arg(long)]
    pub retries: Option<u32>,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(self, config: &mut Config) {
        if let Some(url) = self.url {
            config.options.url = Some(url);
        }

        if let Some(list) = self.list {
            config.options.list = Some(list);
        }

        if let Some(prefix) = self.prefix {
            config.options.prefix = Some(prefix);
        }

        if let Some(out) = self.out {
            config.options.out = Some(out);
        }

        if let Some(delay) = self.timeout {
            config.options.delay_ms = Some(delay);
        }

        if let Some(concurrency) = self.concurrency {
            config.batch.concurrency = concurrency;
        }

        if let Some(done_log) = self.done_log {
            config.batch.done_log = done_log;
        }

        if let Some(retries) = self.retries {
            config.retry.max_retries = retries;
        }
    }
}
