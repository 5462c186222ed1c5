//! Configuration structures and loading logic.

use crate::config::modes::{RunMode, ToolKind};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub http: HttpConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub batch: BatchConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub options: OptionsConfig,
}

/// HTTP client settings used for share pages and direct transfers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Browser user agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept header sent with page requests.
    #[serde(default = "default_accept")]
    pub accept: String,

    /// Accept-Language header sent with page requests.
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Legacy resolution endpoint. `{origin}` and `{id}` are substituted.
    #[serde(default = "default_fallback_endpoint")]
    pub fallback_endpoint: Option<String>,
}

/// Exponential backoff settings for download attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total number of attempts per download.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Retrying stops once the next delay would exceed this, in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Factor applied to the delay after each failed attempt.
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

/// List mode settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Number of downloads in flight at once.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Pause after each successful download, in milliseconds.
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,

    /// File recording every successfully downloaded share URL.
    #[serde(default = "default_done_log")]
    pub done_log: PathBuf,
}

/// External tool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Tools tried for stream manifests, in order.
    #[serde(default = "default_preferred_tools")]
    pub preferred: Vec<ToolKind>,

    /// yt-dlp format selectors, tried in order within one attempt.
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,

    /// Container extension of produced files.
    #[serde(default = "default_container")]
    pub container: String,
}

/// Per-run options, normally supplied on the command line.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Share URL for single mode.
    #[serde(default)]
    pub url: Option<String>,

    /// File of share URLs for batch mode.
    #[serde(default)]
    pub list: Option<PathBuf>,

    /// Filename prefix for batch outputs.
    #[serde(default)]
    pub prefix: Option<String>,

    /// Output file (single mode) or directory (batch mode).
    #[serde(default)]
    pub out: Option<PathBuf>,

    /// Inter-download delay override in milliseconds.
    #[serde(default)]
    pub delay_ms: Option<i64>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept: default_accept(),
            accept_language: default_accept_language(),
            timeout_secs: default_timeout_secs(),
            fallback_endpoint: default_fallback_endpoint(),
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            multiplier: default_multiplier(),
        }
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            cooldown_ms: default_cooldown_ms(),
            done_log: default_done_log(),
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            preferred: default_preferred_tools(),
            formats: default_formats(),
            container: default_container(),
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/144.0.0.0 Safari/537.36".to_string()
}

fn default_accept() -> String {
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string()
}

fn default_accept_language() -> String {
    "en-US,en;q=0.9".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_fallback_endpoint() -> Option<String> {
    Some("{origin}/api/share/info/{id}".to_string())
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    1000
}

fn default_max_delay_ms() -> u64 {
    32_000
}

fn default_multiplier() -> f64 {
    2.0
}

fn default_concurrency() -> usize {
    2
}

fn default_cooldown_ms() -> u64 {
    5000
}

fn default_done_log() -> PathBuf {
    PathBuf::from("done.log")
}

fn default_preferred_tools() -> Vec<ToolKind> {
    vec![ToolKind::YtDlp, ToolKind::Ffmpeg]
}

fn default_formats() -> Vec<String> {
    vec![
        "bestvideo*+bestaudio/best".to_string(),
        "best".to_string(),
    ]
}

fn default_container() -> String {
    "mp4".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!("Configuration file not found: {}", path.display()))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Run mode implied by the options. Call after validation.
    pub fn run_mode(&self) -> Result<RunMode> {
        match (&self.options.url, &self.options.list) {
            (Some(_), None) => Ok(RunMode::Single),
            (None, Some(_)) => Ok(RunMode::Batch),
            _ => Err(Error::MissingConfig(
                "exactly one of --url or --list".to_string(),
            )),
        }
    }

    /// Pause between successful batch downloads.
    pub fn cooldown(&self) -> Duration {
        let ms = match self.options.delay_ms {
            Some(ms) => ms.max(0) as u64,
            None => self.batch.cooldown_ms,
        };
        Duration::from_millis(ms)
    }

    /// Output directory for batch mode.
    pub fn output_directory(&self) -> PathBuf {
        self.options
            .out
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_from_empty_file() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.retry.max_retries, 3);
        assert_eq!(config.batch.concurrency, 2);
        assert_eq!(config.cooldown(), Duration::from_secs(5));
        assert_eq!(config.tools.preferred, vec![ToolKind::YtDlp, ToolKind::Ffmpeg]);
    }

    #[test]
    fn test_load_partial_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[batch]\nconcurrency = 4\ncooldown_ms = 0\n\n[tools]\npreferred = [\"ffmpeg\"]"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.batch.concurrency, 4);
        assert_eq!(config.cooldown(), Duration::ZERO);
        assert_eq!(config.tools.preferred, vec![ToolKind::Ffmpeg]);
        assert_eq!(config.tools.formats.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/share-dl.toml")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_delay_override_wins() {
        let mut config = Config::default();
        config.options.delay_ms = Some(250);
        assert_eq!(config.cooldown(), Duration::from_millis(250));
    }

    #[test]
    fn test_run_mode() {
        let mut config = Config::default();
        assert!(config.run_mode().is_err());

        config.options.url = Some("https://example.com/share/abc".into());
        assert_eq!(config.run_mode().unwrap(), RunMode::Single);

        config.options.list = Some(PathBuf::from("urls.txt"));
        assert!(config.run_mode().is_err());
    }
}
