//! Inline JSON field strategies.

use std::sync::LazyLock;

use regex::Regex;

use crate::extract::strategy::{is_http_url, normalize_slashes, ResolvedUrl, Strategy, StrategyOutcome};

static VIDEO_URL_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""videoUrl"\s*:\s*"((?:[^"\\]|\\.)*)""#).unwrap());

static DOWNLOAD_URL_FIELD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""downloadUrl"\s*:\s*"((?:[^"\\]|\\.)*)""#).unwrap());

static VIDEO_KEY_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""[^"]*(?i:video)[^"]*"\s*:\s*"(https:(?:[^"\\]|\\.)*)""#).unwrap()
});

/// Match a `"videoUrl": "..."` field.
pub fn video_url_field(html: &str) -> StrategyOutcome {
    first_http_capture(&VIDEO_URL_FIELD, html, Strategy::VideoUrlField)
}

/// Match a `"downloadUrl": "..."` field.
pub fn download_url_field(html: &str) -> StrategyOutcome {
    first_http_capture(&DOWNLOAD_URL_FIELD, html, Strategy::DownloadUrlField)
}

/// Match any field whose key contains "video" and whose value is an HTTPS URL.
pub fn video_key_field(html: &str) -> StrategyOutcome {
    first_http_capture(&VIDEO_KEY_FIELD, html, Strategy::VideoKeyField)
}

fn first_http_capture(pattern: &Regex, html: &str, strategy: Strategy) -> StrategyOutcome {
    pattern
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|value| normalize_slashes(value.as_str().trim()))
        .find(|value| is_http_url(value))
        .map(|url| StrategyOutcome::Found(ResolvedUrl::new(url, strategy)))
        .unwrap_or(StrategyOutcome::NotFound)
}
